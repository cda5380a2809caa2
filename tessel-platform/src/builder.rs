// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

use std::collections::BTreeMap;

use log::debug;
use tessel_resources::base::{GetResource, Node, Resource};
use tessel_resources::kernel::{DatatypePolicy, Kernel};
use tessel_resources::memory::Memory;
use tessel_resources::port::Port;
use tessel_resources::topology::Topology;
use tessel_resources::topology_error;
use tessel_resources::types::{ResourceError, ResourceId, ResourceResult};

use crate::types::{LevelSection, PlatformConfig};
use crate::{Levels, Tiles};

/// Name of the memory node created for a level or tile.
pub const MEMORY_NAME: &str = "memory";

#[must_use]
pub fn level_name(level: u32) -> String {
    format!("L{level}")
}

#[must_use]
pub fn tile_name(row: u32, col: u32) -> String {
    format!("tile_{row}_{col}")
}

/// The resources every tile (or a level without tiles) receives.
///
/// Templates are parsed once and copied into each owner.
struct LevelContents {
    memory: Option<Memory>,
    ports: Vec<Port>,
    kernels: Vec<Kernel>,
}

fn build_level_contents(
    section: &LevelSection,
    policy: DatatypePolicy,
) -> ResourceResult<LevelContents> {
    let memory = section.memory.as_ref().map(|memory_section| {
        let mut memory = Memory::new(memory_section.memory_space, memory_section.bytes);
        memory.set_name(MEMORY_NAME);
        memory
    });

    let mut ports = Vec::new();
    for template in &section.ports {
        let port = Port::from_template(template).map_err(|e| in_level(section.level, e))?;
        ports.push(port);
    }

    let mut kernels = Vec::new();
    for description in section.kernels.values() {
        let kernel = Kernel::from_description(None, description, policy)
            .map_err(|e| in_level(section.level, e))?;
        kernels.push(kernel);
    }

    Ok(LevelContents {
        memory,
        ports,
        kernels,
    })
}

/// Qualify the entity of a template error with the level it came from.
fn in_level(level: u32, err: ResourceError) -> ResourceError {
    match err {
        ResourceError::MissingField { entity, field } => ResourceError::MissingField {
            entity: format!("{}: {entity}", level_name(level)),
            field,
        },
        ResourceError::InvalidField {
            entity,
            field,
            reason,
        } => ResourceError::InvalidField {
            entity: format!("{}: {entity}", level_name(level)),
            field,
            reason,
        },
        other => other,
    }
}

/// Insert `node` under `owner`, rejecting a name already used by a sibling.
pub fn insert_unique(
    topology: &mut Topology,
    owner: ResourceId,
    node: impl Into<Node>,
) -> ResourceResult<ResourceId> {
    let node = node.into();
    if topology.find_child(owner, node.name()).is_some() {
        return topology_error!(
            "{}: duplicate resource '{}'",
            topology.full_name(owner)?,
            node.name()
        );
    }
    topology.insert(owner, node)
}

fn populate(
    topology: &mut Topology,
    owner: ResourceId,
    contents: &LevelContents,
) -> ResourceResult {
    if let Some(memory) = &contents.memory {
        insert_unique(topology, owner, memory.clone())?;
    }
    for port in &contents.ports {
        insert_unique(topology, owner, Port::duplicate(port))?;
    }
    for kernel in &contents.kernels {
        insert_unique(topology, owner, kernel.clone())?;
    }
    Ok(())
}

pub fn build_levels(
    topology: &mut Topology,
    cfg: &PlatformConfig,
    policy: DatatypePolicy,
) -> ResourceResult<(Levels, Tiles)> {
    let root = topology.root();
    let mut levels = Levels::new();
    let mut tiles = Tiles::new();

    for section in &cfg.levels {
        if levels.contains_key(&section.level) {
            return topology_error!("Duplicate level {}", section.level);
        }

        let contents = build_level_contents(section, policy)?;
        let level_id = topology.insert(root, Resource::new(&level_name(section.level), None))?;
        levels.insert(section.level, level_id);

        match &section.tiles {
            Some(tiles_section) => {
                if tiles_section.rows == 0 || tiles_section.cols == 0 {
                    return topology_error!(
                        "{}: tiles need at least one row and one column",
                        level_name(section.level)
                    );
                }
                let mut level_tiles = Vec::new();
                for row in 0..tiles_section.rows {
                    for col in 0..tiles_section.cols {
                        let tile_id =
                            topology.insert(level_id, Resource::new(&tile_name(row, col), None))?;
                        populate(topology, tile_id, &contents)?;
                        level_tiles.push(tile_id);
                    }
                }
                debug!(
                    "{}: {} tiles",
                    level_name(section.level),
                    level_tiles.len()
                );
                tiles.insert(section.level, level_tiles);
            }
            None => populate(topology, level_id, &contents)?,
        }
    }
    Ok((levels, tiles))
}

/// Return the handle of a level container.
pub fn lookup_level(levels: &Levels, level: u32) -> ResourceResult<ResourceId> {
    match levels.get(&level) {
        Some(id) => Ok(*id),
        None => topology_error!("No level {level}"),
    }
}

/// Levels in ascending order with their handles.
#[must_use]
pub fn sorted_levels(levels: &Levels) -> Vec<(u32, ResourceId)> {
    let sorted: BTreeMap<u32, ResourceId> = levels.iter().map(|(l, id)| (*l, *id)).collect();
    sorted.into_iter().collect()
}
