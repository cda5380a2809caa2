// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! The resource model of a tiled accelerator.
//!
//! A device is described as a tree of resources owned by a
//! [`Topology`](crate::topology::Topology):
//!
//!  - [ports](crate::port::Port) are rate-bearing interconnect endpoints with
//!    directed connections to other ports.
//!  - [kernels](crate::kernel::Kernel) are compute units with a per-datatype
//!    performance table.
//!  - [memories](crate::memory::Memory) are capacity-bounded storage with a
//!    usage counter.
//!  - containers group the above into the device, levels and tiles.
//!
//! Every node carries the common [`Resource`](crate::base::Resource) fields:
//! a name, a parent handle and a reservation flag. A scheduler reserves
//! resources and consumes memory while it simulates execution, and resets
//! them between independent runs.
//!
//! # Example
//!
//! ```rust
//! use tessel_resources::base::{GetResource, Resource};
//! use tessel_resources::memory::Memory;
//! use tessel_resources::port::Port;
//! use tessel_resources::topology::Topology;
//!
//! let mut topology = Topology::new(Resource::new("device", None));
//! let root = topology.root();
//! let l1 = topology.insert(root, Resource::new("L1", None)).unwrap();
//! let l2 = topology.insert(root, Resource::new("L2", None)).unwrap();
//!
//! let up = topology.insert(l1, Port::link(None, 1, 2, 8.0, 0)).unwrap();
//! let down = topology.insert(l2, Port::link(None, 2, 1, 8.0, 0)).unwrap();
//! topology.connect(up, down).unwrap();
//!
//! let mem = topology.insert(l1, Memory::new(2, 64 * 1024)).unwrap();
//! topology.memory_mut(mem).unwrap().allocate(1024).unwrap();
//!
//! assert_eq!(topology.full_name(up).unwrap(), "device::L1::L1_to_L2_0");
//! assert!(topology.port(down).unwrap().is_connected_to(up));
//!
//! topology.reset_usage();
//! assert_eq!(topology.memory(mem).unwrap().bytes_used(), 0);
//! ```

pub mod base;
pub mod document;
pub mod kernel;
pub mod memory;
pub mod port;
pub mod topology;
pub mod types;
