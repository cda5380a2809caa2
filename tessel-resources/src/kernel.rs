// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Compute kernels and their per-datatype performance profiles.

use std::collections::BTreeMap;
use std::fmt;

use log::debug;
use serde::Deserialize;
use serde_yaml::Value;

use crate::base::{GetResource, Resource};
use crate::document::{as_object, optional, required, required_str};
use crate::types::{ResourceError, ResourceId, ResourceResult};

const ENTITY: &str = "kernel";

/// How to treat a datatype entry that lacks `efficiency` or
/// `ops_per_core_per_cycle`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatatypePolicy {
    /// Record the entry as [`DatatypeProfile::UNSUPPORTED`].
    #[default]
    Tolerant,

    /// Reject the kernel with [`ResourceError::UnsupportedDatatypeSpec`].
    Strict,
}

/// Utilisation efficiency and operations per core per cycle for one datatype.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DatatypeProfile {
    pub efficiency: f64,
    pub ops_per_core_per_cycle: u32,
}

impl DatatypeProfile {
    /// Sentinel for a datatype the kernel cannot be used with.
    pub const UNSUPPORTED: DatatypeProfile = DatatypeProfile {
        efficiency: 0.0,
        ops_per_core_per_cycle: 0,
    };

    #[must_use]
    pub fn new(efficiency: f64, ops_per_core_per_cycle: u32) -> Self {
        Self {
            efficiency,
            ops_per_core_per_cycle,
        }
    }

    #[must_use]
    pub fn is_usable(&self) -> bool {
        *self != Self::UNSUPPORTED
    }
}

impl fmt::Display for DatatypeProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.efficiency, self.ops_per_core_per_cycle)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Kernel {
    resource: Resource,

    // key = datatype name
    datatypes: BTreeMap<String, DatatypeProfile>,
}

impl Kernel {
    #[must_use]
    pub fn new(name: &str, parent: Option<ResourceId>) -> Self {
        Self {
            resource: Resource::new(name, parent),
            datatypes: BTreeMap::new(),
        }
    }

    /// Build a kernel from a description object of the form:
    ///   { name: linalg.matmul,
    ///     datatypes: { i8: { efficiency: 0.9, ops_per_core_per_cycle: 256 } } }
    pub fn from_description(
        parent: Option<ResourceId>,
        description: &Value,
        policy: DatatypePolicy,
    ) -> ResourceResult<Self> {
        let name = required_str(description, ENTITY, "name")?;
        let datatypes = required(description, ENTITY, "datatypes")?;
        let datatypes = as_object(datatypes, &format!("{ENTITY} {name}: datatypes"))?;

        let mut kernel = Kernel::new(name, parent);
        for (datatype_name, datatype) in datatypes {
            let Some(datatype_name) = datatype_name.as_str() else {
                return Err(ResourceError::invalid_field(
                    &format!("{ENTITY} {name}"),
                    "datatypes",
                    format!("datatype key {datatype_name:?} is not a string"),
                ));
            };

            if !datatype.is_mapping() {
                match policy {
                    DatatypePolicy::Tolerant => {
                        debug!("kernel {name}: ignoring datatype '{datatype_name}' (not a mapping)");
                        continue;
                    }
                    DatatypePolicy::Strict => {
                        return Err(ResourceError::UnsupportedDatatypeSpec {
                            kernel: name.to_string(),
                            datatype: datatype_name.to_string(),
                        });
                    }
                }
            }

            let efficiency = optional(datatype, "efficiency").and_then(Value::as_f64);
            let ops = optional(datatype, "ops_per_core_per_cycle")
                .and_then(Value::as_u64)
                .and_then(|ops| u32::try_from(ops).ok());
            kernel.push_datatype(datatype_name, efficiency, ops, policy)?;
        }
        Ok(kernel)
    }

    /// Record the profile for `datatype_name`.
    ///
    /// Both values are needed for the profile to be usable; otherwise the
    /// `policy` decides between storing the sentinel and failing.
    pub fn push_datatype(
        &mut self,
        datatype_name: &str,
        efficiency: Option<f64>,
        ops_per_core_per_cycle: Option<u32>,
        policy: DatatypePolicy,
    ) -> ResourceResult {
        let profile = match (efficiency, ops_per_core_per_cycle) {
            (Some(efficiency), Some(ops)) => DatatypeProfile::new(efficiency, ops),
            _ => match policy {
                DatatypePolicy::Tolerant => {
                    debug!(
                        "kernel {}: datatype '{datatype_name}' partially specified, marking unsupported",
                        self.name()
                    );
                    DatatypeProfile::UNSUPPORTED
                }
                DatatypePolicy::Strict => {
                    return Err(ResourceError::UnsupportedDatatypeSpec {
                        kernel: self.name().to_string(),
                        datatype: datatype_name.to_string(),
                    });
                }
            },
        };
        self.datatypes.insert(datatype_name.to_string(), profile);
        Ok(())
    }

    #[must_use]
    pub fn profile(&self, datatype_name: &str) -> Option<DatatypeProfile> {
        self.datatypes.get(datatype_name).copied()
    }

    /// True if the datatype is listed with a usable profile.
    #[must_use]
    pub fn supports(&self, datatype_name: &str) -> bool {
        self.profile(datatype_name)
            .is_some_and(|profile| profile.is_usable())
    }

    pub fn datatypes(&self) -> impl Iterator<Item = (&str, &DatatypeProfile)> {
        self.datatypes
            .iter()
            .map(|(name, profile)| (name.as_str(), profile))
    }

    #[must_use]
    pub fn num_datatypes(&self) -> usize {
        self.datatypes.len()
    }
}

impl GetResource for Kernel {
    fn resource(&self) -> &Resource {
        &self.resource
    }

    fn resource_mut(&mut self) -> &mut Resource {
        &mut self.resource
    }
}
