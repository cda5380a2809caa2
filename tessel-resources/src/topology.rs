// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! The arena that owns every node of a device's resource hierarchy.
//!
//! Nodes refer to each other (parent links and port connections) through
//! [`ResourceId`] handles rather than references, so the whole hierarchy is a
//! plain owned value. A topology always has a root, created with it, which is
//! the only node without a parent.

use std::fmt;

use log::{debug, warn};

use crate::base::{GetResource, Node, Resource};
use crate::kernel::Kernel;
use crate::memory::Memory;
use crate::port::Port;
use crate::types::{ResourceError, ResourceId, ResourceResult};

static JOIN: &str = "::";

#[derive(Clone, Debug)]
pub struct Topology {
    nodes: Vec<Node>,

    // children[i] lists the children of nodes[i] in insertion order
    children: Vec<Vec<ResourceId>>,
}

impl Topology {
    #[must_use]
    pub fn new(mut root: Resource) -> Self {
        root.parent = None;
        Self {
            nodes: vec![Node::Container(root)],
            children: vec![Vec::new()],
        }
    }

    #[must_use]
    pub fn root(&self) -> ResourceId {
        ResourceId(0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Store `node` under `parent` and return its handle.
    pub fn insert(
        &mut self,
        parent: ResourceId,
        node: impl Into<Node>,
    ) -> ResourceResult<ResourceId> {
        self.get(parent)?;
        let mut node = node.into();
        node.set_parent(Some(parent));

        let id = ResourceId(self.nodes.len());
        self.nodes.push(node);
        self.children.push(Vec::new());
        self.children[parent.0].push(id);
        debug!(
            "insert {} {}",
            self.nodes[id.0].kind_name(),
            self.full_name(id).unwrap_or_default()
        );
        Ok(id)
    }

    pub fn get(&self, id: ResourceId) -> ResourceResult<&Node> {
        self.nodes
            .get(id.0)
            .ok_or(ResourceError::UnknownResource(id))
    }

    pub fn get_mut(&mut self, id: ResourceId) -> ResourceResult<&mut Node> {
        self.nodes
            .get_mut(id.0)
            .ok_or(ResourceError::UnknownResource(id))
    }

    pub fn port(&self, id: ResourceId) -> ResourceResult<&Port> {
        self.get(id)?.as_port().ok_or(ResourceError::NotAPort(id))
    }

    pub fn port_mut(&mut self, id: ResourceId) -> ResourceResult<&mut Port> {
        self.get_mut(id)?
            .as_port_mut()
            .ok_or(ResourceError::NotAPort(id))
    }

    pub fn kernel(&self, id: ResourceId) -> ResourceResult<&Kernel> {
        self.get(id)?.as_kernel().ok_or(ResourceError::NotAKernel(id))
    }

    pub fn memory(&self, id: ResourceId) -> ResourceResult<&Memory> {
        self.get(id)?.as_memory().ok_or(ResourceError::NotAMemory(id))
    }

    pub fn memory_mut(&mut self, id: ResourceId) -> ResourceResult<&mut Memory> {
        self.get_mut(id)?
            .as_memory_mut()
            .ok_or(ResourceError::NotAMemory(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (ResourceId(i), node))
    }

    /// Direct children of `id` in the order they were attached.
    ///
    /// Only [`Topology::insert`] and [`Topology::set_parent`] change the
    /// child lists; a raw [`GetResource::set_parent`] on a node does not.
    #[must_use]
    pub fn children(&self, id: ResourceId) -> &[ResourceId] {
        self.children.get(id.0).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn find_child(&self, parent: ResourceId, name: &str) -> Option<ResourceId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|child| self.nodes[child.0].name() == name)
    }

    /// Ancestors of `id`, nearest first, ending with the root.
    pub fn ancestors(&self, id: ResourceId) -> ResourceResult<Vec<ResourceId>> {
        let mut ancestors = Vec::new();
        let mut current = self.get(id)?.parent();
        while let Some(parent) = current {
            // Raw `set_parent` calls on nodes can bypass the cycle check
            if ancestors.len() >= self.nodes.len() {
                return Err(ResourceError::CyclicParent {
                    child: self.get(id)?.name().to_string(),
                    parent: self.get(parent)?.name().to_string(),
                });
            }
            ancestors.push(parent);
            current = self.get(parent)?.parent();
        }
        Ok(ancestors)
    }

    /// Returns the full hierarchical name of a node
    pub fn full_name(&self, id: ResourceId) -> ResourceResult<String> {
        let mut names = Vec::new();
        for ancestor in self.ancestors(id)?.iter().rev() {
            names.push(self.get(*ancestor)?.name());
        }
        names.push(self.get(id)?.name());
        Ok(names.join(JOIN))
    }

    /// Move `child` under `parent`.
    ///
    /// Fails if this would make `child` its own ancestor.
    pub fn set_parent(&mut self, child: ResourceId, parent: ResourceId) -> ResourceResult {
        self.get(child)?;
        if parent == child || self.ancestors(parent)?.contains(&child) {
            return Err(ResourceError::CyclicParent {
                child: self.full_name(child)?,
                parent: self.full_name(parent)?,
            });
        }
        self.get_mut(child)?.set_parent(Some(parent));
        for siblings in &mut self.children {
            siblings.retain(|id| *id != child);
        }
        self.children[parent.0].push(child);
        Ok(())
    }

    /// Add a directed edge from port `from` to port `to`.
    ///
    /// The edge is keyed by the name of `to`, so it replaces any earlier edge
    /// to a port of the same name. The replaced target, if any, is returned.
    pub fn add_connection(
        &mut self,
        from: ResourceId,
        to: ResourceId,
    ) -> ResourceResult<Option<ResourceId>> {
        let to_name = self.port(to)?.name().to_string();
        let previous = self.port_mut(from)?.add_connection(&to_name, to);
        if let Some(previous) = previous
            && previous != to
        {
            warn!(
                "{}: connection '{to_name}' now refers to {} instead of {}",
                self.full_name(from)?,
                self.full_name(to)?,
                self.full_name(previous)?,
            );
        }
        debug!("connect {} -> {}", self.full_name(from)?, self.full_name(to)?);
        Ok(previous)
    }

    /// Connect two ports in both directions.
    pub fn connect(&mut self, a: ResourceId, b: ResourceId) -> ResourceResult {
        // Check both ends before mutating either
        self.port(a)?;
        self.port(b)?;
        self.add_connection(a, b)?;
        self.add_connection(b, a)?;
        Ok(())
    }

    pub fn reserve(&mut self, id: ResourceId) -> ResourceResult {
        self.get_mut(id)?.reserve();
        Ok(())
    }

    pub fn reset_reservation(&mut self, id: ResourceId) -> ResourceResult {
        self.get_mut(id)?.reset_reservation();
        Ok(())
    }

    /// Clear the reservation flag of every node.
    pub fn reset_reservations(&mut self) {
        for node in &mut self.nodes {
            node.reset_reservation();
        }
    }

    /// Clear the usage counter of every memory.
    pub fn reset_usage(&mut self) {
        for node in &mut self.nodes {
            if let Some(memory) = node.as_memory_mut() {
                memory.reset_usage();
            }
        }
    }

    fn fmt_node(&self, f: &mut fmt::Formatter<'_>, id: ResourceId, depth: usize) -> fmt::Result {
        let node = &self.nodes[id.0];
        if depth > self.nodes.len() {
            // Only reachable after raw parent rewrites introduced a cycle
            return writeln!(f, "<cycle at {}>", node.name());
        }
        let indent = "  ".repeat(depth);
        let name = if node.name().is_empty() {
            "<unnamed>"
        } else {
            node.name()
        };
        match node {
            Node::Container(_) => writeln!(f, "{indent}{name}")?,
            Node::Port(port) => {
                let connections: Vec<&str> = port.connected_ports().map(|(n, _)| n).collect();
                writeln!(
                    f,
                    "{indent}port {name} ({} B/cycle) -> [{}]",
                    port.data_rate,
                    connections.join(", ")
                )?;
            }
            Node::Kernel(kernel) => {
                writeln!(f, "{indent}kernel {name}")?;
                for (datatype, profile) in kernel.datatypes() {
                    writeln!(f, "{indent}  {datatype}: {profile}")?;
                }
            }
            Node::Memory(memory) => writeln!(
                f,
                "{indent}memory {name} (space {}, {}/{} bytes used)",
                memory.memory_space(),
                memory.bytes_used(),
                memory.bytes()
            )?,
        }
        for child in self.children(id) {
            self.fmt_node(f, *child, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(f, self.root(), 0)
    }
}
