// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! The fields and behaviour shared by every node of the resource model.

use serde_yaml::Value;

use crate::document::optional_str;
use crate::kernel::Kernel;
use crate::memory::Memory;
use crate::port::Port;
use crate::types::{ResourceId, ResourceResult};

/// Field of a description object that names a device-level resource.
pub const DEVICE_NAME_FIELD: &str = "devicename";

/// Identity, position in the hierarchy and reservation state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Resource {
    /// Identifier, unique within the owning scope only.
    pub name: String,

    /// Enclosing resource. Only the root of a topology has none.
    pub parent: Option<ResourceId>,

    /// Set while the resource is allocated to an in-flight scheduling
    /// decision.
    pub is_reserved: bool,
}

impl Resource {
    #[must_use]
    pub fn new(name: &str, parent: Option<ResourceId>) -> Self {
        Self {
            name: name.to_string(),
            parent,
            is_reserved: false,
        }
    }

    /// Create a resource named by the `devicename` field of `description`.
    pub fn from_description(description: Option<&Value>) -> ResourceResult<Self> {
        let mut resource = Self::default();
        resource.set_name_from_description(description)?;
        Ok(resource)
    }

    /// Take the name from the `devicename` field of a description object.
    ///
    /// A missing object or a missing field leaves the resource unnamed.
    pub fn set_name_from_description(&mut self, description: Option<&Value>) -> ResourceResult {
        let name = match description {
            Some(description) => optional_str(description, "device", DEVICE_NAME_FIELD)?,
            None => None,
        };
        self.set_name(name.unwrap_or(""));
        Ok(())
    }
}

/// Access to the common [`Resource`] fields of any node kind.
pub trait GetResource {
    fn resource(&self) -> &Resource;
    fn resource_mut(&mut self) -> &mut Resource;

    fn name(&self) -> &str {
        &self.resource().name
    }

    fn parent(&self) -> Option<ResourceId> {
        self.resource().parent
    }

    fn is_reserved(&self) -> bool {
        self.resource().is_reserved
    }

    fn set_name(&mut self, name: &str) {
        self.resource_mut().name = name.to_string();
    }

    /// Rewrite the back-link only. Keeping the tree consistent is up to the
    /// caller; [`Topology::set_parent`](crate::topology::Topology::set_parent)
    /// does the checking.
    fn set_parent(&mut self, parent: Option<ResourceId>) {
        self.resource_mut().parent = parent;
    }

    fn reserve(&mut self) {
        self.resource_mut().is_reserved = true;
    }

    fn reset_reservation(&mut self) {
        self.resource_mut().is_reserved = false;
    }
}

impl GetResource for Resource {
    fn resource(&self) -> &Resource {
        self
    }

    fn resource_mut(&mut self) -> &mut Resource {
        self
    }
}

/// A node stored in a [`Topology`](crate::topology::Topology).
///
/// `Container` is a purely structural resource such as the device, a level of
/// the memory hierarchy or a tile.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Container(Resource),
    Port(Port),
    Kernel(Kernel),
    Memory(Memory),
}

impl Node {
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Container(_) => "container",
            Node::Port(_) => "port",
            Node::Kernel(_) => "kernel",
            Node::Memory(_) => "memory",
        }
    }

    #[must_use]
    pub fn as_port(&self) -> Option<&Port> {
        match self {
            Node::Port(port) => Some(port),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_port_mut(&mut self) -> Option<&mut Port> {
        match self {
            Node::Port(port) => Some(port),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_kernel(&self) -> Option<&Kernel> {
        match self {
            Node::Kernel(kernel) => Some(kernel),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_memory(&self) -> Option<&Memory> {
        match self {
            Node::Memory(memory) => Some(memory),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_memory_mut(&mut self) -> Option<&mut Memory> {
        match self {
            Node::Memory(memory) => Some(memory),
            _ => None,
        }
    }
}

impl GetResource for Node {
    fn resource(&self) -> &Resource {
        match self {
            Node::Container(resource) => resource,
            Node::Port(port) => port.resource(),
            Node::Kernel(kernel) => kernel.resource(),
            Node::Memory(memory) => memory.resource(),
        }
    }

    fn resource_mut(&mut self) -> &mut Resource {
        match self {
            Node::Container(resource) => resource,
            Node::Port(port) => port.resource_mut(),
            Node::Kernel(kernel) => kernel.resource_mut(),
            Node::Memory(memory) => memory.resource_mut(),
        }
    }
}

impl From<Resource> for Node {
    fn from(resource: Resource) -> Self {
        Node::Container(resource)
    }
}

impl From<Port> for Node {
    fn from(port: Port) -> Self {
        Node::Port(port)
    }
}

impl From<Kernel> for Node {
    fn from(kernel: Kernel) -> Self {
        Node::Kernel(kernel)
    }
}

impl From<Memory> for Node {
    fn from(memory: Memory) -> Self {
        Node::Memory(memory)
    }
}
