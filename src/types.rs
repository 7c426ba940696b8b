use std::fmt;
use std::ops::Deref;

pub use codeq::config::Crc32fast;

/// This crate use Crc32fast checksum.
pub type Checksum = Crc32fast;

/// Identifier of a storage node taking part in a replica group.
///
/// Ids only have meaning through equality; the derived ordering exists so that
/// role sets are stored and encoded deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct InstanceId(pub u64);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for InstanceId {
    fn from(id: u64) -> Self {
        InstanceId(id)
    }
}

impl Deref for InstanceId {
    type Target = u64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Identifies one segment: the volume it belongs to and its index in the
/// volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct SegId {
    pub volume_id: u64,
    pub index: u32,
}

impl SegId {
    pub fn new(volume_id: u64, index: u32) -> Self {
        Self { volume_id, index }
    }
}

impl fmt::Display for SegId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SegId({}:{})", self.volume_id, self.index)
    }
}

/// Id of the IO request on whose behalf two membership observations are
/// merged. Only used for logging.
pub type RequestId = u64;
