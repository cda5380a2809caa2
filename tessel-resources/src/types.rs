// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Shared types.

use std::error::Error;
use std::fmt;

/// Handle to a node stored in a [`Topology`](crate::topology::Topology).
///
/// Handles are only meaningful for the topology that returned them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(pub usize);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[macro_export]
/// Build a [ResourceError::Topology] from a format string and arguments
macro_rules! topology_error {
    ($($arg:tt)+) => {
        Err($crate::types::ResourceError::Topology(format!($($arg)+)))
    };
}

/// Errors raised while building or mutating the resource model.
#[derive(Clone, PartialEq)]
pub enum ResourceError {
    /// A required field is absent from a description document.
    MissingField { entity: String, field: String },

    /// A field is present but has the wrong type or an out-of-range value.
    InvalidField {
        entity: String,
        field: String,
        reason: String,
    },

    /// A kernel datatype entry is only partially specified and the strict
    /// datatype policy is in force.
    UnsupportedDatatypeSpec { kernel: String, datatype: String },

    UnknownResource(ResourceId),
    NotAPort(ResourceId),
    NotAKernel(ResourceId),
    NotAMemory(ResourceId),

    /// Rewiring `child` under `parent` would break the tree.
    CyclicParent { child: String, parent: String },

    CapacityExceeded {
        memory: String,
        requested: u64,
        available: u64,
    },

    InvalidRelease {
        memory: String,
        requested: u64,
        used: u64,
    },

    /// Any other failure while assembling a topology.
    Topology(String),
}

impl ResourceError {
    #[must_use]
    pub fn missing_field(entity: &str, field: &str) -> Self {
        ResourceError::MissingField {
            entity: entity.to_string(),
            field: field.to_string(),
        }
    }

    #[must_use]
    pub fn invalid_field(entity: &str, field: &str, reason: impl Into<String>) -> Self {
        ResourceError::InvalidField {
            entity: entity.to_string(),
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ResourceError::MissingField { entity, field } => {
                write!(f, "Error: {entity}: missing field '{field}'")
            }
            ResourceError::InvalidField {
                entity,
                field,
                reason,
            } => {
                write!(f, "Error: {entity}: invalid field '{field}': {reason}")
            }
            ResourceError::UnsupportedDatatypeSpec { kernel, datatype } => {
                write!(
                    f,
                    "Error: kernel {kernel}: datatype '{datatype}' needs both 'efficiency' and 'ops_per_core_per_cycle'"
                )
            }
            ResourceError::UnknownResource(id) => {
                write!(f, "Error: no resource {id}")
            }
            ResourceError::NotAPort(id) => {
                write!(f, "Error: resource {id} is not a port")
            }
            ResourceError::NotAKernel(id) => {
                write!(f, "Error: resource {id} is not a kernel")
            }
            ResourceError::NotAMemory(id) => {
                write!(f, "Error: resource {id} is not a memory")
            }
            ResourceError::CyclicParent { child, parent } => {
                write!(
                    f,
                    "Error: cannot make '{parent}' the parent of '{child}' (cycle)"
                )
            }
            ResourceError::CapacityExceeded {
                memory,
                requested,
                available,
            } => {
                write!(
                    f,
                    "Error: memory {memory}: cannot allocate {requested} bytes, {available} available"
                )
            }
            ResourceError::InvalidRelease {
                memory,
                requested,
                used,
            } => {
                write!(
                    f,
                    "Error: memory {memory}: cannot release {requested} bytes, {used} in use"
                )
            }
            ResourceError::Topology(msg) => {
                write!(f, "Error: {msg}")
            }
        }
    }
}

// Shows the message when a result is unwrapped.
impl fmt::Debug for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl Error for ResourceError {}

/// The return type for most resource model functions
pub type ResourceResult<T = ()> = Result<T, ResourceError>;
