use std::fmt;

/// Version of a segment membership.
///
/// The epoch advances whenever the primary changes; the generation orders the
/// role reassignments made under one primary. Versions compare
/// lexicographically, epoch first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct SegmentVersion {
    pub epoch: u64,
    pub generation: u64,
}

impl SegmentVersion {
    pub fn new(epoch: u64, generation: u64) -> Self {
        Self { epoch, generation }
    }

    pub fn increment_generation(&self) -> Self {
        self.increment_generation_by(1)
    }

    pub fn increment_generation_by(&self, n: u64) -> Self {
        Self::new(self.epoch, self.generation + n)
    }

    /// Starts a new epoch, resetting the generation.
    pub fn increment_epoch(&self) -> Self {
        Self::new(self.epoch + 1, 0)
    }
}

impl fmt::Display for SegmentVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SegmentVersion(epoch={}, generation={})",
            self.epoch, self.generation
        )
    }
}

impl From<(u64, u64)> for SegmentVersion {
    fn from((epoch, generation): (u64, u64)) -> Self {
        Self::new(epoch, generation)
    }
}
