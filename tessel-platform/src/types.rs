// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Types that map directly to the hardware-description document

use byte_unit::Byte;
use serde::{Deserialize, de};
use serde_yaml::{Mapping, Value};
use tessel_resources::kernel::DatatypePolicy;

/// Parse a value which could be an integer or a string and return u64 value
///
/// The string can be a hex string with underscores or a Byte string that
/// specifies units. Some examples are:
///  0x10000
///  0x1_0000
///  64KiB, 512KB, 2MiB
pub fn parse_byte_str<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: de::Deserializer<'de>,
{
    // Deserialize to a generic `Value` first so that plain integers are
    // accepted as they are.
    let value: Value = Deserialize::deserialize(deserializer)?;

    if let Some(number) = value.as_u64() {
        return Ok(number);
    }

    let s = match value.as_str() {
        Some(s) => s.to_owned(),
        None => {
            return Err(de::Error::custom(format!(
                "'{value:?}': Unsupported type for Deserialize (should be u64 or String)"
            )));
        }
    };

    // Convert to lowercase in order to standardise any 0x prefix
    let lowercase = s.to_lowercase();

    if lowercase.starts_with("0x") {
        let without_underscore = lowercase.replace('_', "");
        let without_0x = without_underscore.trim_start_matches("0x");
        u64::from_str_radix(without_0x, 16)
            .map_err(|e| de::Error::custom(format!("Unable to parse {s} as hex string: {e}")))
    } else {
        let ignore_case = false;
        let num_bytes = Byte::parse_str(&s, ignore_case)
            .map_err(|e| de::Error::custom(format!("Unable to parse {s} as Byte string: {e}")))?;
        Ok(num_bytes.as_u64())
    }
}

fn default_count() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct PlatformConfig {
    /// Read separately through `Resource::set_name_from_description`.
    pub devicename: Option<Value>,
    pub datatype_policy: Option<DatatypePolicy>,
    #[serde(default)]
    pub levels: Vec<LevelSection>,
    #[serde(default)]
    pub links: Vec<LinkSection>,
    #[serde(default)]
    pub memory_access: Vec<MemoryAccessSection>,
}

#[derive(Debug, Deserialize)]
pub struct LevelSection {
    pub level: u32,
    pub tiles: Option<TilesSection>,
    pub memory: Option<MemorySection>,

    /// Port templates, built with `Port::from_template`.
    #[serde(default)]
    pub ports: Vec<Value>,

    /// Kernel descriptions keyed by kernel name, built with
    /// `Kernel::from_description`.
    #[serde(default)]
    pub kernels: Mapping,
}

#[derive(Debug, Deserialize)]
pub struct TilesSection {
    pub rows: u32,
    pub cols: u32,
}

#[derive(Debug, Deserialize)]
pub struct MemorySection {
    pub memory_space: u32,
    #[serde(deserialize_with = "parse_byte_str")]
    pub bytes: u64,
}

#[derive(Debug, Deserialize)]
pub struct LinkSection {
    pub src: u32,
    pub dst: u32,
    pub bytes_per_cycle: f64,
    #[serde(default = "default_count")]
    pub count: u32,
}

#[derive(Debug, Deserialize)]
pub struct MemoryAccessSection {
    pub level: u32,
    pub memory_space: String,
    pub bytes_per_cycle: Option<f64>,
    #[serde(default = "default_count")]
    pub count: u32,
}
