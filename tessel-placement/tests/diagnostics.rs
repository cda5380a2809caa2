// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

use std::sync::{Mutex, Once};

use log::{Level, LevelFilter, Log, Metadata, Record};

use tessel_placement::Program;

/// Keeps every error-level line logged while the tests run.
struct CapturedLog {
    lines: Mutex<Vec<String>>,
}

impl Log for CapturedLog {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Error
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            self.lines.lock().unwrap().push(record.args().to_string());
        }
    }

    fn flush(&self) {}
}

static CAPTURED: CapturedLog = CapturedLog {
    lines: Mutex::new(Vec::new()),
};
static INIT: Once = Once::new();

/// Lines logged so far that mention `herd`. Tests run in parallel so each
/// one uses its own herd names.
fn logged_for(herd: &str) -> Vec<String> {
    INIT.call_once(|| {
        log::set_logger(&CAPTURED).unwrap();
        log::set_max_level(LevelFilter::Error);
    });
    let prefix = format!("herd {herd}:");
    CAPTURED
        .lines
        .lock()
        .unwrap()
        .iter()
        .filter(|line| line.starts_with(&prefix))
        .cloned()
        .collect()
}

#[test]
fn non_constant_shape_logged() {
    logged_for("");
    let program = Program::from_string(
        r#"
functions:
  - name: f
    body:
      - herd: { name: symbolic, shape: [1, "%n"], x_loc: 0, y_loc: 0 }
      - herd: { name: constant, shape: [1, 1], x_loc: 0, y_loc: 0 }
"#,
    )
    .unwrap();
    let _ = program.placements();

    assert_eq!(
        logged_for("symbolic"),
        vec!["herd symbolic: only constant sized herds are supported (dimension '%n')"]
    );
    assert!(logged_for("constant").is_empty());
}

#[test]
fn every_error_of_a_herd_logged() {
    logged_for("");
    let program = Program::from_string(
        r#"functions: [{name: f, body: [{herd: {name: adrift, shape: ["%m", 2], x_loc: -1}}]}]"#,
    )
    .unwrap();
    let _ = program.placements();

    assert_eq!(
        logged_for("adrift"),
        vec![
            "herd adrift: only constant sized herds are supported (dimension '%m')",
            "herd adrift: invalid x or y location (x_loc: -1, y_loc: missing)",
        ]
    );
}
