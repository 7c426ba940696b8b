use crate::errors::InvalidMembership;
use crate::membership::RawMembership;
use crate::InstanceId;
use crate::SegmentMembership;

/// Whether `myself`, currently at `current`, may adopt the `higher`
/// membership.
///
/// A node refuses only a group that is already full of `total_members` alive
/// members without it.
pub fn ok_to_update_to_higher_membership(
    higher: &SegmentMembership,
    current: &SegmentMembership,
    myself: InstanceId,
    total_members: usize,
) -> bool {
    if !higher.contains(myself) && higher.alive_size() == total_members {
        log::warn!(
            "{} can not update from {} to {}: it does not contain me and it is full",
            myself,
            current,
            higher
        );
        return false;
    }

    true
}

impl SegmentMembership {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a membership from JSON and check its structural invariants.
    pub fn from_json(s: &str) -> Result<Self, InvalidMembership> {
        let raw: RawMembership = serde_json::from_str(s)
            .map_err(|e| InvalidMembership::new(format!("bad json: {}", e)))?;
        Self::try_from(raw)
    }
}
