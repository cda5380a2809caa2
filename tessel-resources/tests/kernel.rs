// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

use serde_yaml::Value;
use tessel_resources::base::GetResource;
use tessel_resources::kernel::{DatatypePolicy, DatatypeProfile, Kernel};
use tessel_resources::types::{ResourceError, ResourceId};

fn parse(s: &str) -> Value {
    serde_yaml::from_str(s).unwrap()
}

const MATMUL: &str = "
name: linalg.matmul
datatypes:
  i8:
    efficiency: 0.73
    ops_per_core_per_cycle: 256
  bf16:
    efficiency: 0.5
  f32:
    ops_per_core_per_cycle: 8
  i32: {}
";

#[test]
fn fully_specified_stored_exactly() {
    let kernel =
        Kernel::from_description(Some(ResourceId(1)), &parse(MATMUL), DatatypePolicy::Tolerant)
            .unwrap();
    assert_eq!(kernel.name(), "linalg.matmul");
    assert_eq!(kernel.parent(), Some(ResourceId(1)));
    assert_eq!(kernel.profile("i8"), Some(DatatypeProfile::new(0.73, 256)));
    assert!(kernel.supports("i8"));
}

#[test]
fn partial_entries_become_sentinel() {
    let kernel =
        Kernel::from_description(None, &parse(MATMUL), DatatypePolicy::Tolerant).unwrap();
    assert_eq!(kernel.num_datatypes(), 4);
    for datatype in ["bf16", "f32", "i32"] {
        assert_eq!(kernel.profile(datatype), Some(DatatypeProfile::UNSUPPORTED));
        assert!(!kernel.supports(datatype));
    }
    assert_eq!(kernel.profile("f64"), None);
}

#[test]
fn strict_rejects_partial_entry() {
    let err = Kernel::from_description(None, &parse(MATMUL), DatatypePolicy::Strict).unwrap_err();
    // Datatypes are visited in document order, bf16 is the first partial one
    assert_eq!(
        err,
        ResourceError::UnsupportedDatatypeSpec {
            kernel: "linalg.matmul".to_string(),
            datatype: "bf16".to_string(),
        }
    );
}

#[test]
fn non_mapping_entry_skipped_when_tolerant() {
    let doc = parse("{name: k, datatypes: {i8: 3, i16: {efficiency: 1, ops_per_core_per_cycle: 4}}}");
    let kernel = Kernel::from_description(None, &doc, DatatypePolicy::Tolerant).unwrap();
    assert_eq!(kernel.num_datatypes(), 1);
    assert_eq!(kernel.profile("i16"), Some(DatatypeProfile::new(1.0, 4)));
}

#[test]
fn negative_ops_is_partial() {
    let doc = parse("{name: k, datatypes: {i8: {efficiency: 1, ops_per_core_per_cycle: -4}}}");
    let kernel = Kernel::from_description(None, &doc, DatatypePolicy::Tolerant).unwrap();
    assert_eq!(kernel.profile("i8"), Some(DatatypeProfile::UNSUPPORTED));
}

#[test]
#[should_panic(expected = "missing field 'name'")]
fn missing_name() {
    Kernel::from_description(None, &parse("{datatypes: {}}"), DatatypePolicy::Tolerant).unwrap();
}

#[test]
#[should_panic(expected = "missing field 'datatypes'")]
fn missing_datatypes() {
    Kernel::from_description(None, &parse("{name: k}"), DatatypePolicy::Tolerant).unwrap();
}

#[test]
fn push_datatype_policy() {
    let mut kernel = Kernel::new("k", None);
    kernel
        .push_datatype("i8", Some(0.25), Some(16), DatatypePolicy::Strict)
        .unwrap();
    kernel
        .push_datatype("i4", None, Some(16), DatatypePolicy::Tolerant)
        .unwrap();
    assert!(
        kernel
            .push_datatype("i2", Some(1.0), None, DatatypePolicy::Strict)
            .is_err()
    );

    let datatypes: Vec<&str> = kernel.datatypes().map(|(name, _)| name).collect();
    assert_eq!(datatypes, vec!["i4", "i8"]);
}
