// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Capacity-bounded storage.
//!
//! A `Memory` is bookkeeping state for an external allocator: the model keeps
//! the capacity and a usage counter. The checked helpers keep
//! `bytes_used <= bytes`; [`Memory::set_bytes_used`] does not.

use crate::base::{GetResource, Resource};
use crate::types::{ResourceError, ResourceResult};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Memory {
    resource: Resource,
    memory_space: u32,
    bytes: u64,
    bytes_used: u64,
}

impl Memory {
    #[must_use]
    pub fn new(memory_space: u32, bytes: u64) -> Self {
        Self {
            resource: Resource::default(),
            memory_space,
            bytes,
            bytes_used: 0,
        }
    }

    #[must_use]
    pub fn memory_space(&self) -> u32 {
        self.memory_space
    }

    #[must_use]
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    #[must_use]
    pub fn bytes_used(&self) -> u64 {
        self.bytes_used
    }

    #[must_use]
    pub fn available_bytes(&self) -> u64 {
        self.bytes.saturating_sub(self.bytes_used)
    }

    pub fn set_bytes_used(&mut self, bytes_used: u64) {
        self.bytes_used = bytes_used;
    }

    pub fn allocate(&mut self, num_bytes: u64) -> ResourceResult {
        let available = self.available_bytes();
        if num_bytes > available {
            return Err(ResourceError::CapacityExceeded {
                memory: self.name().to_string(),
                requested: num_bytes,
                available,
            });
        }
        self.bytes_used += num_bytes;
        Ok(())
    }

    pub fn release(&mut self, num_bytes: u64) -> ResourceResult {
        if num_bytes > self.bytes_used {
            return Err(ResourceError::InvalidRelease {
                memory: self.name().to_string(),
                requested: num_bytes,
                used: self.bytes_used,
            });
        }
        self.bytes_used -= num_bytes;
        Ok(())
    }

    /// Forget all usage, e.g. between independent simulation epochs.
    pub fn reset_usage(&mut self) {
        self.bytes_used = 0;
    }
}

impl GetResource for Memory {
    fn resource(&self) -> &Resource {
        &self.resource
    }

    fn resource_mut(&mut self) -> &mut Resource {
        &mut self.resource
    }
}
