// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Build the resource [`Topology`] of a device from a hardware-description
//! document.
//!
//! The document is YAML (JSON documents are accepted as they are valid YAML):
//!
//! ```yaml
//! devicename: npu-test
//! datatype_policy: tolerant
//! levels:
//!   - level: 1
//!     tiles: { rows: 2, cols: 2 }
//!     memory: { memory_space: 2, bytes: 64KiB }
//!     ports:
//!       - { type: dma, idx: "0", bytes_per_cycle: 4 }
//!     kernels:
//!       linalg.matmul:
//!         name: linalg.matmul
//!         datatypes:
//!           i8: { efficiency: 0.9, ops_per_core_per_cycle: 256 }
//!   - level: 2
//!     memory: { memory_space: 1, bytes: 512KiB }
//! links:
//!   - { src: 1, dst: 2, bytes_per_cycle: 8, count: 2 }
//! memory_access:
//!   - { level: 2, memory_space: L3, bytes_per_cycle: 16 }
//! ```
//!
//! The device is the root of the topology, each level is a container `L<n>`
//! below it and tiles are containers `tile_<row>_<col>` below their level.

use std::collections::HashMap;
use std::fmt::Display;
use std::path::Path;

use log::info;
use serde_yaml::Value;
use tessel_resources::base::{Node, Resource};
use tessel_resources::kernel::DatatypePolicy;
use tessel_resources::topology::Topology;
use tessel_resources::types::{ResourceError, ResourceId, ResourceResult};

use crate::builder::{build_levels, lookup_level, sorted_levels};
use crate::connect::{build_links, build_memory_accesses};
use crate::types::PlatformConfig;

pub mod builder;
pub mod connect;
pub mod types;

pub type Levels = HashMap<u32, ResourceId>;
pub type Tiles = HashMap<u32, Vec<ResourceId>>;

pub struct Platform {
    topology: Topology,
    levels: Levels,
    tiles: Tiles,
}

impl Platform {
    pub fn from_file(description_path: &Path) -> ResourceResult<Self> {
        Platform::from_file_with_policy(description_path, None)
    }

    /// Load a description, overriding its `datatype_policy` if `policy` is
    /// given.
    pub fn from_file_with_policy(
        description_path: &Path,
        policy: Option<DatatypePolicy>,
    ) -> ResourceResult<Self> {
        let s = std::fs::read_to_string(description_path).map_err(|e| {
            ResourceError::Topology(format!(
                "Unable to read {}: {e}",
                description_path.display()
            ))
        })?;
        Platform::from_string_with_policy(&s, policy)
    }

    pub fn from_string(description: &str) -> ResourceResult<Self> {
        Platform::from_string_with_policy(description, None)
    }

    pub fn from_string_with_policy(
        description: &str,
        policy: Option<DatatypePolicy>,
    ) -> ResourceResult<Self> {
        let value: Value = serde_yaml::from_str(description)
            .map_err(|e| ResourceError::Topology(format!("serde_yaml::from_str failed: {e}")))?;
        Platform::from_value(&value, policy)
    }

    pub fn from_value(description: &Value, policy: Option<DatatypePolicy>) -> ResourceResult<Self> {
        let cfg: PlatformConfig = serde_yaml::from_value(description.clone())
            .map_err(|e| ResourceError::Topology(format!("serde_yaml::from_value failed: {e}")))?;
        let policy = policy.or(cfg.datatype_policy).unwrap_or_default();
        let device = Resource::from_description(Some(description))?;
        Platform::build(device, &cfg, policy)
    }

    fn build(device: Resource, cfg: &PlatformConfig, policy: DatatypePolicy) -> ResourceResult<Self> {
        let mut topology = Topology::new(device);
        let (levels, tiles) = build_levels(&mut topology, cfg, policy)?;
        build_links(&mut topology, &levels, cfg)?;
        build_memory_accesses(&mut topology, &levels, cfg)?;

        let platform = Platform {
            topology,
            levels,
            tiles,
        };
        info!("built platform: {}", platform.summary());
        Ok(platform)
    }

    #[must_use]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Mutable access for the scheduler's reservation and usage writes.
    pub fn topology_mut(&mut self) -> &mut Topology {
        &mut self.topology
    }

    #[must_use]
    pub fn into_topology(self) -> Topology {
        self.topology
    }

    pub fn level(&self, level: u32) -> ResourceResult<ResourceId> {
        lookup_level(&self.levels, level)
    }

    #[must_use]
    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    /// Level numbers in ascending order.
    #[must_use]
    pub fn level_numbers(&self) -> Vec<u32> {
        sorted_levels(&self.levels)
            .into_iter()
            .map(|(level, _)| level)
            .collect()
    }

    /// Tiles of a level in row-major order. Empty if the level has no tiles.
    #[must_use]
    pub fn tiles(&self, level: u32) -> &[ResourceId] {
        self.tiles.get(&level).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn summary(&self) -> PlatformSummary {
        let mut summary = PlatformSummary::default();
        for (_, node) in self.topology.iter() {
            match node {
                Node::Container(_) => summary.containers += 1,
                Node::Port(_) => summary.ports += 1,
                Node::Kernel(_) => summary.kernels += 1,
                Node::Memory(memory) => {
                    summary.memories += 1;
                    summary.memory_bytes += memory.bytes();
                }
            }
        }
        summary.tiles = self.tiles.values().map(Vec::len).sum();
        summary
    }
}

impl Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.summary())?;
        writeln!(f)?;
        write!(f, "{}", self.topology)
    }
}

/// Node counts of a platform.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlatformSummary {
    pub containers: usize,
    pub tiles: usize,
    pub ports: usize,
    pub kernels: usize,
    pub memories: usize,
    pub memory_bytes: u64,
}

impl Display for PlatformSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} tiles, {} ports, {} kernels, {} memories ({} bytes)",
            self.tiles, self.ports, self.kernels, self.memories, self.memory_bytes
        )
    }
}
