// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Herd declarations as they appear in a program description, and the errors
//! produced while placing them.

use std::fmt;

use serde::Deserialize;

/// Name given to herds that do not declare one.
pub const DEFAULT_HERD_NAME: &str = "herd";

/// Largest number of tiles a single herd may cover.
pub const MAX_HERD_TILES: u64 = 1 << 16;

/// One dimension of a herd shape.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Dimension {
    Constant(u32),

    /// A value only known at run time, e.g. `"%n"`.
    Symbol(String),
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Dimension::Constant(n) => write!(f, "{n}"),
            Dimension::Symbol(s) => write!(f, "{s}"),
        }
    }
}

/// A `herd` operation of the program.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct HerdOp {
    pub name: Option<String>,

    /// `[rows, cols]`
    pub shape: [Dimension; 2],
    pub x_loc: Option<i64>,
    pub y_loc: Option<i64>,
}

impl HerdOp {
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_HERD_NAME)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HerdError {
    NonConstantShape {
        herd: String,
        dimension: String,
    },
    InvalidPlacement {
        herd: String,
        x_loc: Option<i64>,
        y_loc: Option<i64>,
    },
    ShapeTooLarge {
        herd: String,
        rows: u32,
        cols: u32,
    },
}

fn location(loc: Option<i64>) -> String {
    loc.map_or_else(|| "missing".to_string(), |l| l.to_string())
}

impl fmt::Display for HerdError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HerdError::NonConstantShape { herd, dimension } => {
                write!(
                    f,
                    "herd {herd}: only constant sized herds are supported (dimension '{dimension}')"
                )
            }
            HerdError::InvalidPlacement { herd, x_loc, y_loc } => {
                write!(
                    f,
                    "herd {herd}: invalid x or y location (x_loc: {}, y_loc: {})",
                    location(*x_loc),
                    location(*y_loc)
                )
            }
            HerdError::ShapeTooLarge { herd, rows, cols } => {
                write!(
                    f,
                    "herd {herd}: {rows}x{cols} covers more than {MAX_HERD_TILES} tiles"
                )
            }
        }
    }
}

impl std::error::Error for HerdError {}

#[derive(Debug)]
pub enum PlacementError {
    Io(std::io::Error),
    Parse(String),
    InvalidHerds(Vec<HerdError>),
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PlacementError::Io(e) => write!(f, "Error: {e}"),
            PlacementError::Parse(msg) => write!(f, "Error: {msg}"),
            PlacementError::InvalidHerds(errors) => {
                write!(f, "Error: {} invalid herd(s)", errors.len())?;
                for e in errors {
                    write!(f, "\n  {e}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for PlacementError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlacementError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PlacementError {
    fn from(e: std::io::Error) -> Self {
        PlacementError::Io(e)
    }
}

pub type PlacementResult<T = ()> = Result<T, PlacementError>;

/// What to write when some herds cannot be placed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartialOutput {
    /// Write every valid herd, then report the failures.
    #[default]
    EmitValid,

    /// Write nothing unless every herd is valid.
    Suppress,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_from_yaml() {
        let shape: [Dimension; 2] = serde_yaml::from_str("[4, \"%n\"]").unwrap();
        assert_eq!(shape[0], Dimension::Constant(4));
        assert_eq!(shape[1], Dimension::Symbol("%n".to_string()));
    }

    #[test]
    fn invalid_placement_message() {
        let e = HerdError::InvalidPlacement {
            herd: "h".to_string(),
            x_loc: Some(-1),
            y_loc: None,
        };
        assert_eq!(
            e.to_string(),
            "herd h: invalid x or y location (x_loc: -1, y_loc: missing)"
        );
    }
}
