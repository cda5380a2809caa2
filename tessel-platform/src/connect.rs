// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Ports synthesized from programmatic link and memory-access requests.

use log::debug;
use tessel_resources::port::Port;
use tessel_resources::topology::Topology;
use tessel_resources::topology_error;
use tessel_resources::types::{ResourceId, ResourceResult};

use crate::Levels;
use crate::builder::{insert_unique, lookup_level};
use crate::types::{LinkSection, MemoryAccessSection, PlatformConfig};

/// Create and connect one pair of link ports per requested lane.
///
/// Lane `i` of a link from level `src` to level `dst` is a port
/// `L<src>_to_L<dst>_<i>` in `src` connected both ways to a port
/// `L<dst>_to_L<src>_<i>` in `dst`.
pub fn build_link(
    topology: &mut Topology,
    levels: &Levels,
    link: &LinkSection,
) -> ResourceResult<Vec<(ResourceId, ResourceId)>> {
    if link.src == link.dst {
        return topology_error!("Link from level {} to itself", link.src);
    }
    if link.bytes_per_cycle.is_nan() || link.bytes_per_cycle < 0.0 {
        return topology_error!(
            "Link L{} to L{}: invalid bytes_per_cycle {}",
            link.src,
            link.dst,
            link.bytes_per_cycle
        );
    }

    let src_level = lookup_level(levels, link.src)?;
    let dst_level = lookup_level(levels, link.dst)?;

    let mut pairs = Vec::new();
    for idx in 0..link.count {
        let from = insert_unique(
            topology,
            src_level,
            Port::link(None, link.src, link.dst, link.bytes_per_cycle, idx),
        )?;
        let to = insert_unique(
            topology,
            dst_level,
            Port::link(None, link.dst, link.src, link.bytes_per_cycle, idx),
        )?;
        topology.connect(from, to)?;
        pairs.push((from, to));
    }
    Ok(pairs)
}

pub fn build_links(topology: &mut Topology, levels: &Levels, cfg: &PlatformConfig) -> ResourceResult {
    for link in &cfg.links {
        build_link(topology, levels, link)?;
    }
    Ok(())
}

/// Add the memory-access ports of one request. Requests without a rate
/// describe nothing to model and add no ports.
pub fn build_memory_access(
    topology: &mut Topology,
    levels: &Levels,
    access: &MemoryAccessSection,
) -> ResourceResult<Vec<ResourceId>> {
    let level = lookup_level(levels, access.level)?;
    if let Some(rate) = access.bytes_per_cycle
        && (rate.is_nan() || rate < 0.0)
    {
        return topology_error!(
            "Memory access {} in L{}: invalid bytes_per_cycle {rate}",
            access.memory_space,
            access.level
        );
    }

    let mut ports = Vec::new();
    for idx in 0..access.count {
        match Port::memory_access(
            Some(level),
            &access.memory_space,
            access.bytes_per_cycle,
            idx,
        ) {
            Some(port) => ports.push(insert_unique(topology, level, port)?),
            None => {
                debug!(
                    "L{}: no rate for {}_{idx}, port not created",
                    access.level, access.memory_space
                );
            }
        }
    }
    Ok(ports)
}

pub fn build_memory_accesses(
    topology: &mut Topology,
    levels: &Levels,
    cfg: &PlatformConfig,
) -> ResourceResult {
    for access in &cfg.memory_access {
        build_memory_access(topology, levels, access)?;
    }
    Ok(())
}
