// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Interconnect ports.
//!
//! A port is a rate-bearing endpoint. Its connections are directed edges
//! keyed by the name of the port at the other end; registering a link in both
//! directions is done through
//! [`Topology::connect`](crate::topology::Topology::connect).

use std::collections::BTreeMap;

use serde_yaml::Value;

use crate::base::{GetResource, Resource};
use crate::document::{required_label, required_str, required_u64};
use crate::types::{ResourceId, ResourceResult};

const ENTITY: &str = "port";

/// Capability marker for the kind of traffic a port carries.
///
/// No behaviour differs between kinds yet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PortKind {
    #[default]
    Generic,
    Stream,
    MemoryMapped,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Port {
    resource: Resource,

    /// Bytes transferable per simulation cycle.
    pub data_rate: f64,

    pub kind: PortKind,

    connected_ports: BTreeMap<String, ResourceId>,
}

impl Port {
    /// Build a port from a description template of the form:
    ///   { type: dma, idx: "2", bytes_per_cycle: 4 }
    ///
    /// The port is named `<type>_<idx>`.
    pub fn from_template(template: &Value) -> ResourceResult<Self> {
        let port_type = required_str(template, ENTITY, "type")?;
        let idx = required_label(template, ENTITY, "idx")?;
        let bytes_per_cycle = required_u64(template, ENTITY, "bytes_per_cycle")?;

        let mut port = Self::default();
        port.set_name(&format!("{port_type}_{idx}"));
        port.data_rate = bytes_per_cycle as f64;
        Ok(port)
    }

    /// Copy the name, rate and kind of `base`.
    ///
    /// Connections are not copied: the duplicate starts disconnected and
    /// without a parent, and the caller has to re-establish its edges in the
    /// new position of the hierarchy.
    #[must_use]
    pub fn duplicate(base: &Port) -> Self {
        Self {
            resource: Resource::new(base.name(), None),
            data_rate: base.data_rate,
            kind: base.kind,
            connected_ports: BTreeMap::new(),
        }
    }

    /// Synthesize a link port between two levels of the hierarchy, named
    /// `L<src>_to_L<dst>_<idx>`.
    #[must_use]
    pub fn link(
        parent: Option<ResourceId>,
        src: u32,
        dst: u32,
        data_rate: f64,
        idx: u32,
    ) -> Self {
        Self {
            resource: Resource::new(&format!("L{src}_to_L{dst}_{idx}"), parent),
            data_rate,
            kind: PortKind::Generic,
            connected_ports: BTreeMap::new(),
        }
    }

    /// Synthesize a port giving access to a memory space, named
    /// `<memory_space>_<idx>`.
    ///
    /// Without a rate there is nothing to model and no port is built.
    #[must_use]
    pub fn memory_access(
        parent: Option<ResourceId>,
        memory_space: &str,
        bytes_per_cycle: Option<f64>,
        idx: u32,
    ) -> Option<Self> {
        let data_rate = bytes_per_cycle?;
        Some(Self {
            resource: Resource::new(&format!("{memory_space}_{idx}"), parent),
            data_rate,
            kind: PortKind::MemoryMapped,
            connected_ports: BTreeMap::new(),
        })
    }

    /// Record a directed edge to `other`, keyed by `other_name`.
    ///
    /// An existing edge with the same key is replaced and its target
    /// returned.
    pub fn add_connection(&mut self, other_name: &str, other: ResourceId) -> Option<ResourceId> {
        self.connected_ports.insert(other_name.to_string(), other)
    }

    #[must_use]
    pub fn connection(&self, name: &str) -> Option<ResourceId> {
        self.connected_ports.get(name).copied()
    }

    #[must_use]
    pub fn is_connected_to(&self, other: ResourceId) -> bool {
        self.connected_ports.values().any(|id| *id == other)
    }

    #[must_use]
    pub fn num_connections(&self) -> usize {
        self.connected_ports.len()
    }

    pub fn connected_ports(&self) -> impl Iterator<Item = (&str, ResourceId)> {
        self.connected_ports
            .iter()
            .map(|(name, id)| (name.as_str(), *id))
    }
}

impl GetResource for Port {
    fn resource(&self) -> &Resource {
        &self.resource
    }

    fn resource_mut(&mut self) -> &mut Resource {
        &mut self.resource
    }
}
