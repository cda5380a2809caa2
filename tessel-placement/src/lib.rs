// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Expand the herds of a program into the absolute tiles they occupy and
//! write them out as JSON.
//!
//! A program is described in YAML (or JSON):
//!
//! ```yaml
//! functions:
//!   - name: forward
//!     body:
//!       - herd: { name: herd_0, shape: [2, 3], x_loc: 0, y_loc: 1 }
//!       - launch:
//!           body:
//!             - herd: { shape: [1, "%n"], x_loc: 2, y_loc: 3 }
//! ```
//!
//! Herds are numbered in the order they appear, walking each function body
//! depth first. A herd anchored at `(x_loc, y_loc)` with shape `[rows, cols]`
//! covers tile `(y_loc - i, x_loc + j)` for every `i < rows`, `j < cols`.
//!
//! ```rust
//! use tessel_placement::{Program, write_document};
//! use tessel_placement::types::PartialOutput;
//!
//! let program = Program::from_string(
//!     "functions: [{name: f, body: [{herd: {shape: [1, 2], x_loc: 3, y_loc: 0}}]}]",
//! )
//! .unwrap();
//!
//! let mut out = Vec::new();
//! write_document(&program, &mut out, PartialOutput::EmitValid).unwrap();
//! assert_eq!(
//!     String::from_utf8(out).unwrap(),
//!     "{\n\t\"herds\": [\n\t\t\t\t   [0, \"herd\", [0, 3], [0, 4]]\n\t]\n}\n"
//! );
//! ```

use std::fmt;
use std::io::Write;
use std::path::Path;

use log::{debug, error};
use serde_yaml::Value;

use crate::types::{
    Dimension, HerdError, HerdOp, MAX_HERD_TILES, PartialOutput, PlacementError,
    PlacementResult,
};

pub mod types;

/// Written between two herd entries.
pub const ENTRY_SEPARATOR: &str = ",\n\t\t\t\t   ";

/// Opens the document the herd entries are written into.
pub const DOCUMENT_OPENING: &str = "{\n\t\"herds\": [\n\t\t\t\t   ";

/// Closes the document after the last herd entry.
pub const DOCUMENT_CLOSING: &str = "\n\t]\n}\n";

/// A function of the program with its herds in source order.
#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    pub name: String,
    pub herds: Vec<HerdOp>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Program {
    pub functions: Vec<Function>,
}

fn parse_error<T>(msg: String) -> PlacementResult<T> {
    Err(PlacementError::Parse(msg))
}

/// Collect the herds of a region, descending into every nested `body`.
fn collect_herds(body: &Value, context: &str, herds: &mut Vec<HerdOp>) -> PlacementResult {
    let Some(ops) = body.as_sequence() else {
        return parse_error(format!("{context}: 'body' is not a sequence"));
    };

    for op in ops {
        let Some(op) = op.as_mapping() else {
            return parse_error(format!("{context}: operation is not a mapping"));
        };
        for (kind, attrs) in op {
            if kind.as_str() == Some("herd") {
                let herd: HerdOp = serde_yaml::from_value(attrs.clone())
                    .map_err(|e| PlacementError::Parse(format!("{context}: herd: {e}")))?;
                herds.push(herd);
            }
            if let Some(nested) = attrs.get("body") {
                collect_herds(nested, context, herds)?;
            }
        }
    }
    Ok(())
}

impl Program {
    pub fn from_file(program_path: &Path) -> PlacementResult<Self> {
        let s = std::fs::read_to_string(program_path)?;
        Program::from_string(&s)
    }

    pub fn from_string(program: &str) -> PlacementResult<Self> {
        let value: Value = serde_yaml::from_str(program)
            .map_err(|e| PlacementError::Parse(format!("serde_yaml::from_str failed: {e}")))?;
        Program::from_value(&value)
    }

    pub fn from_value(program: &Value) -> PlacementResult<Self> {
        let Some(functions) = program.get("functions") else {
            return parse_error("program: missing field 'functions'".to_string());
        };
        let Some(functions) = functions.as_sequence() else {
            return parse_error("program: 'functions' is not a sequence".to_string());
        };

        let mut parsed = Vec::new();
        for function in functions {
            let name = function
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let mut herds = Vec::new();
            if let Some(body) = function.get("body") {
                collect_herds(body, &format!("function '{name}'"), &mut herds)?;
            }
            debug!("function '{name}': {} herds", herds.len());
            parsed.push(Function { name, herds });
        }
        Ok(Program { functions: parsed })
    }

    /// All herds of the program in discovery order.
    pub fn herds(&self) -> impl Iterator<Item = &HerdOp> {
        self.functions.iter().flat_map(|f| f.herds.iter())
    }

    /// Place every herd. Each herd takes the next index whether or not it
    /// can be placed.
    #[must_use]
    pub fn placements(&self) -> Vec<Result<HerdPlacement, Vec<HerdError>>> {
        self.herds()
            .enumerate()
            .map(|(index, herd)| {
                let placement = place_herd(index, herd);
                if let Err(errors) = &placement {
                    for e in errors {
                        error!("{e}");
                    }
                }
                placement
            })
            .collect()
    }
}

/// The tiles covered by a herd, row-major from its anchor.
///
/// Returns `None` if the herd covers more than [`MAX_HERD_TILES`] tiles or a
/// coordinate does not fit in an `i64`.
#[must_use]
pub fn expand(rows: u32, cols: u32, x_loc: i64, y_loc: i64) -> Option<Vec<(i64, i64)>> {
    let num_tiles = u64::from(rows) * u64::from(cols);
    if num_tiles > MAX_HERD_TILES {
        return None;
    }
    x_loc.checked_add(i64::from(cols.saturating_sub(1)))?;
    y_loc.checked_sub(i64::from(rows.saturating_sub(1)))?;

    let mut tiles = Vec::with_capacity(usize::try_from(num_tiles).ok()?);
    for i in 0..i64::from(rows) {
        for j in 0..i64::from(cols) {
            tiles.push((y_loc - i, x_loc + j));
        }
    }
    Some(tiles)
}

/// Place one herd, reporting every problem found with it.
pub fn place_herd(index: usize, herd: &HerdOp) -> Result<HerdPlacement, Vec<HerdError>> {
    let mut errors = Vec::new();

    let mut shape = [0; 2];
    for (dimension, size) in herd.shape.iter().zip(shape.iter_mut()) {
        match dimension {
            Dimension::Constant(n) => *size = *n,
            Dimension::Symbol(s) => errors.push(HerdError::NonConstantShape {
                herd: herd.name().to_string(),
                dimension: s.clone(),
            }),
        }
    }
    let [rows, cols] = shape;

    let anchor = match (herd.x_loc, herd.y_loc) {
        (Some(x_loc), Some(y_loc)) if x_loc >= 0 && y_loc >= 0 => Some((x_loc, y_loc)),
        (x_loc, y_loc) => {
            errors.push(HerdError::InvalidPlacement {
                herd: herd.name().to_string(),
                x_loc,
                y_loc,
            });
            None
        }
    };
    let Some((x_loc, y_loc)) = anchor.filter(|_| errors.is_empty()) else {
        return Err(errors);
    };

    if u64::from(rows) * u64::from(cols) > MAX_HERD_TILES {
        return Err(vec![HerdError::ShapeTooLarge {
            herd: herd.name().to_string(),
            rows,
            cols,
        }]);
    }
    match expand(rows, cols, x_loc, y_loc) {
        Some(tiles) => Ok(HerdPlacement {
            index,
            name: herd.name().to_string(),
            tiles,
        }),
        None => Err(vec![HerdError::InvalidPlacement {
            herd: herd.name().to_string(),
            x_loc: Some(x_loc),
            y_loc: Some(y_loc),
        }]),
    }
}

/// A placed herd, written as `[index, "name", [row, col], ...]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HerdPlacement {
    pub index: usize,
    pub name: String,
    pub tiles: Vec<(i64, i64)>,
}

fn write_json_string(f: &mut fmt::Formatter, s: &str) -> fmt::Result {
    write!(f, "\"")?;
    for c in s.chars() {
        match c {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\t' => write!(f, "\\t")?,
            c if c.is_control() => write!(f, "\\u{:04x}", c as u32)?,
            c => write!(f, "{c}")?,
        }
    }
    write!(f, "\"")
}

impl fmt::Display for HerdPlacement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}, ", self.index)?;
        write_json_string(f, &self.name)?;
        for (row, col) in &self.tiles {
            write!(f, ", [{row}, {col}]")?;
        }
        write!(f, "]")
    }
}

fn partition(
    placements: Vec<Result<HerdPlacement, Vec<HerdError>>>,
) -> (Vec<HerdPlacement>, Vec<HerdError>) {
    let mut valid = Vec::new();
    let mut errors = Vec::new();
    for placement in placements {
        match placement {
            Ok(p) => valid.push(p),
            Err(e) => errors.extend(e),
        }
    }
    (valid, errors)
}

fn finish(written: usize, errors: Vec<HerdError>) -> PlacementResult<usize> {
    if errors.is_empty() {
        Ok(written)
    } else {
        Err(PlacementError::InvalidHerds(errors))
    }
}

fn write_entries<W: Write>(out: &mut W, entries: &[HerdPlacement]) -> PlacementResult {
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            write!(out, "{ENTRY_SEPARATOR}")?;
        }
        write!(out, "{entry}")?;
    }
    write!(out, "{DOCUMENT_CLOSING}")?;
    Ok(())
}

/// Write the herd entries followed by the closing of the enclosing document.
///
/// Returns the number of entries written. If any herd could not be placed
/// the result is `InvalidHerds`; whether the valid entries are still written
/// depends on `policy`.
pub fn write_fragment<W: Write>(
    program: &Program,
    out: &mut W,
    policy: PartialOutput,
) -> PlacementResult<usize> {
    let (valid, errors) = partition(program.placements());
    if policy == PartialOutput::Suppress && !errors.is_empty() {
        return finish(0, errors);
    }
    write_entries(out, &valid)?;
    finish(valid.len(), errors)
}

/// As [`write_fragment`], preceded by the opening of the document so that the
/// output is complete JSON.
pub fn write_document<W: Write>(
    program: &Program,
    out: &mut W,
    policy: PartialOutput,
) -> PlacementResult<usize> {
    let (valid, errors) = partition(program.placements());
    if policy == PartialOutput::Suppress && !errors.is_empty() {
        return finish(0, errors);
    }
    write!(out, "{DOCUMENT_OPENING}")?;
    write_entries(out, &valid)?;
    finish(valid.len(), errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_empty() {
        assert_eq!(expand(0, 3, 1, 1), Some(vec![]));
        assert_eq!(expand(3, 0, 1, 1), Some(vec![]));
    }

    #[test]
    fn expand_single() {
        assert_eq!(expand(1, 1, 5, 7), Some(vec![(7, 5)]));
    }

    #[test]
    fn expand_out_of_range() {
        assert_eq!(expand(1, 2, i64::MAX, 0), None);
        assert_eq!(expand(1, 1, i64::MAX, 0), Some(vec![(0, i64::MAX)]));
        assert_eq!(expand(2, 1, 0, i64::MIN), None);
        assert_eq!(expand(u32::MAX, u32::MAX, 0, 0), None);
    }

    #[test]
    fn escaped_name() {
        let placement = HerdPlacement {
            index: 3,
            name: "a\"b\\c".to_string(),
            tiles: vec![(0, 0)],
        };
        assert_eq!(placement.to_string(), r#"[3, "a\"b\\c", [0, 0]]"#);
    }
}
