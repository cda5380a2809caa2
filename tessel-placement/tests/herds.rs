// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

use std::io::Write;

use tessel_placement::types::{HerdError, PartialOutput, PlacementError};
use tessel_placement::{
    DOCUMENT_CLOSING, DOCUMENT_OPENING, Program, expand, write_document, write_fragment,
};

const MIXED: &str = r#"
functions:
  - name: forward
    body:
      - herd: { name: herd_0, shape: [2, 3], x_loc: 0, y_loc: 1 }
      - launch:
          body:
            - herd: { name: dynamic, shape: [1, "%n"], x_loc: 2, y_loc: 3 }
            - herd: { shape: [1, 2], x_loc: 4, y_loc: 0 }
"#;

fn fragment(program: &Program, policy: PartialOutput) -> (String, Result<usize, PlacementError>) {
    let mut out = Vec::new();
    let result = write_fragment(program, &mut out, policy);
    (String::from_utf8(out).unwrap(), result)
}

#[test]
fn row_major_expansion() {
    assert_eq!(
        expand(2, 3, 0, 1),
        Some(vec![(1, 0), (1, 1), (1, 2), (0, 0), (0, 1), (0, 2)])
    );
}

#[test]
fn discovery_order() {
    let program = Program::from_string(MIXED).unwrap();
    let names: Vec<&str> = program.herds().map(|herd| herd.name()).collect();
    assert_eq!(names, vec!["herd_0", "dynamic", "herd"]);
}

#[test]
fn herds_across_functions() {
    let program = Program::from_string(
        "
functions:
  - name: a
    body:
      - herd: { name: first, shape: [1, 1], x_loc: 0, y_loc: 0 }
  - name: b
    body:
      - segment:
          body:
            - launch:
                body:
                  - herd: { name: second, shape: [1, 1], x_loc: 1, y_loc: 1 }
  - name: empty
",
    )
    .unwrap();
    assert_eq!(program.functions.len(), 3);
    assert_eq!(program.functions[2].herds.len(), 0);

    let placements: Vec<_> = program
        .placements()
        .into_iter()
        .map(Result::unwrap)
        .collect();
    assert_eq!(placements[1].index, 1);
    assert_eq!(placements[1].name, "second");
    assert_eq!(placements[1].tiles, vec![(1, 1)]);
}

#[test]
fn single_herd_fragment() {
    let program = Program::from_string(
        "functions: [{name: f, body: [{herd: {name: h, shape: [2, 3], x_loc: 0, y_loc: 1}}]}]",
    )
    .unwrap();
    let (text, result) = fragment(&program, PartialOutput::EmitValid);
    assert_eq!(result.unwrap(), 1);
    assert_eq!(
        text,
        "[0, \"h\", [1, 0], [1, 1], [1, 2], [0, 0], [0, 1], [0, 2]]\n\t]\n}\n"
    );
}

#[test]
fn non_constant_shape_returned_and_others_written() {
    let program = Program::from_string(MIXED).unwrap();
    let (text, result) = fragment(&program, PartialOutput::EmitValid);

    // The failing herd still consumes index 1
    assert_eq!(
        text,
        "[0, \"herd_0\", [1, 0], [1, 1], [1, 2], [0, 0], [0, 1], [0, 2]],\n\t\t\t\t   \
         [2, \"herd\", [0, 4], [0, 5]]\n\t]\n}\n"
    );
    match result {
        Err(PlacementError::InvalidHerds(errors)) => {
            assert_eq!(
                errors,
                vec![HerdError::NonConstantShape {
                    herd: "dynamic".to_string(),
                    dimension: "%n".to_string(),
                }]
            );
        }
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
fn suppress_writes_nothing() {
    let program = Program::from_string(MIXED).unwrap();
    let (text, result) = fragment(&program, PartialOutput::Suppress);
    assert!(text.is_empty());
    assert!(matches!(result, Err(PlacementError::InvalidHerds(errors)) if errors.len() == 1));

    let mut out = Vec::new();
    assert!(write_document(&program, &mut out, PartialOutput::Suppress).is_err());
    assert!(out.is_empty());
}

#[test]
fn suppress_without_failures_writes_everything() {
    let program = Program::from_string(
        "functions: [{name: f, body: [{herd: {shape: [1, 1], x_loc: 0, y_loc: 0}}]}]",
    )
    .unwrap();
    let (suppressed, result) = fragment(&program, PartialOutput::Suppress);
    assert_eq!(result.unwrap(), 1);
    let (emitted, _) = fragment(&program, PartialOutput::EmitValid);
    assert_eq!(suppressed, emitted);
}

#[test]
fn invalid_anchor() {
    let program = Program::from_string(
        "
functions:
  - name: f
    body:
      - herd: { name: negative, shape: [1, 1], x_loc: -1, y_loc: 0 }
      - herd: { name: missing, shape: [1, 1], x_loc: 0 }
",
    )
    .unwrap();
    let placements = program.placements();
    assert_eq!(
        placements[0],
        Err(vec![HerdError::InvalidPlacement {
            herd: "negative".to_string(),
            x_loc: Some(-1),
            y_loc: Some(0),
        }])
    );
    assert_eq!(
        placements[1],
        Err(vec![HerdError::InvalidPlacement {
            herd: "missing".to_string(),
            x_loc: Some(0),
            y_loc: None,
        }])
    );

    let (text, result) = fragment(&program, PartialOutput::EmitValid);
    assert_eq!(text, DOCUMENT_CLOSING);
    assert!(matches!(result, Err(PlacementError::InvalidHerds(errors)) if errors.len() == 2));
}

#[test]
fn default_herd_name() {
    let program = Program::from_string(
        "functions: [{name: f, body: [{herd: {shape: [1, 1], x_loc: 0, y_loc: 0}}]}]",
    )
    .unwrap();
    let placement = program.placements().remove(0).unwrap();
    assert_eq!(placement.name, "herd");
}

#[test]
fn complete_document() {
    let program = Program::from_string(
        "functions: [{name: f, body: [{herd: {name: a, shape: [1, 1], x_loc: 0, y_loc: 0}},
                                     {herd: {name: b, shape: [1, 1], x_loc: 1, y_loc: 0}}]}]",
    )
    .unwrap();
    let mut out = Vec::new();
    assert_eq!(
        write_document(&program, &mut out, PartialOutput::EmitValid).unwrap(),
        2
    );
    let text = String::from_utf8(out).unwrap();
    assert_eq!(
        text,
        format!("{DOCUMENT_OPENING}[0, \"a\", [0, 0]],\n\t\t\t\t   [1, \"b\", [0, 1]]{DOCUMENT_CLOSING}")
    );
}

#[test]
fn from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(MIXED.as_bytes()).unwrap();
    let program = Program::from_file(file.path()).unwrap();
    assert_eq!(program.herds().count(), 3);
}

#[test]
#[should_panic(expected = "missing field 'functions'")]
fn missing_functions() {
    Program::from_string("modules: []").unwrap();
}

#[test]
#[should_panic(expected = "function 'f': herd")]
fn herd_without_shape() {
    Program::from_string("functions: [{name: f, body: [{herd: {x_loc: 0, y_loc: 0}}]}]").unwrap();
}

#[test]
fn every_problem_reported() {
    let program = Program::from_string(
        r#"
functions:
  - name: f
    body:
      - herd: { name: broken, shape: ["%m", "%n"], y_loc: -2 }
"#,
    )
    .unwrap();
    assert_eq!(
        program.placements()[0],
        Err(vec![
            HerdError::NonConstantShape {
                herd: "broken".to_string(),
                dimension: "%m".to_string(),
            },
            HerdError::NonConstantShape {
                herd: "broken".to_string(),
                dimension: "%n".to_string(),
            },
            HerdError::InvalidPlacement {
                herd: "broken".to_string(),
                x_loc: None,
                y_loc: Some(-2),
            },
        ])
    );
}

#[test]
fn anchor_at_coordinate_limit() {
    let program = Program::from_string(&format!(
        "
functions:
  - name: f
    body:
      - herd: {{ name: edge, shape: [1, 2], x_loc: {}, y_loc: 0 }}
      - herd: {{ name: fits, shape: [1, 1], x_loc: {}, y_loc: 0 }}
",
        i64::MAX,
        i64::MAX
    ))
    .unwrap();
    let (text, result) = fragment(&program, PartialOutput::EmitValid);

    assert_eq!(
        text,
        format!("[1, \"fits\", [0, {}]]{DOCUMENT_CLOSING}", i64::MAX)
    );
    match result {
        Err(PlacementError::InvalidHerds(errors)) => {
            assert_eq!(
                errors,
                vec![HerdError::InvalidPlacement {
                    herd: "edge".to_string(),
                    x_loc: Some(i64::MAX),
                    y_loc: Some(0),
                }]
            );
        }
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
fn oversized_shape() {
    let program = Program::from_string(
        "
functions:
  - name: f
    body:
      - herd: { name: huge, shape: [4294967295, 4294967295], x_loc: 0, y_loc: 0 }
      - herd: { name: small, shape: [1, 1], x_loc: 0, y_loc: 0 }
",
    )
    .unwrap();
    let (text, result) = fragment(&program, PartialOutput::EmitValid);

    assert_eq!(text, format!("[1, \"small\", [0, 0]]{DOCUMENT_CLOSING}"));
    match result {
        Err(PlacementError::InvalidHerds(errors)) => {
            assert_eq!(
                errors,
                vec![HerdError::ShapeTooLarge {
                    herd: "huge".to_string(),
                    rows: u32::MAX,
                    cols: u32::MAX,
                }]
            );
        }
        other => panic!("unexpected result {other:?}"),
    }
}
