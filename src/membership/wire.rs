use crate::errors::InvalidMembership;
use crate::types::SegId;
use crate::InstanceId;
use crate::SegmentMembership;
use crate::SegmentVersion;

/// Flat transport representation of a segment membership, as carried in
/// requests between storage nodes and the coordinator.
///
/// Role sets are plain id lists; an optional id of `0` received from a peer
/// is treated as absent.
#[derive(Debug, Clone, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct MembershipWire {
    pub volume_id: u64,
    pub segment_index: u32,
    pub epoch: u64,
    pub generation: u64,
    pub primary: u64,

    #[serde(default)]
    pub secondaries: Vec<u64>,
    #[serde(default)]
    pub arbiters: Vec<u64>,
    #[serde(default)]
    pub joining_secondaries: Vec<u64>,
    #[serde(default)]
    pub inactive_secondaries: Vec<u64>,

    #[serde(default)]
    pub temp_primary: Option<u64>,
    #[serde(default)]
    pub secondary_candidate: Option<u64>,
    #[serde(default)]
    pub primary_candidate: Option<u64>,

    /// Lease span granted along with the membership, in milliseconds.
    #[serde(default)]
    pub lease: Option<u32>,
}

fn to_vec<'a>(ids: impl IntoIterator<Item = &'a InstanceId>) -> Vec<u64> {
    ids.into_iter().map(|id| id.0).collect()
}

fn optional(id: Option<u64>) -> Option<InstanceId> {
    id.filter(|x| *x != 0).map(InstanceId)
}

impl MembershipWire {
    /// Flatten `membership` of segment `seg_id`. A `lease` of 0 means no
    /// lease.
    pub fn new(seg_id: SegId, membership: &SegmentMembership, lease: u32) -> Self {
        Self {
            volume_id: seg_id.volume_id,
            segment_index: seg_id.index,
            epoch: membership.version.epoch,
            generation: membership.version.generation,
            primary: membership.primary.0,
            secondaries: to_vec(&membership.secondaries),
            arbiters: to_vec(&membership.arbiters),
            joining_secondaries: to_vec(&membership.joining_secondaries),
            inactive_secondaries: to_vec(&membership.inactive_secondaries),
            temp_primary: membership.temp_primary.map(|x| x.0),
            secondary_candidate: membership.secondary_candidate.map(|x| x.0),
            primary_candidate: membership.primary_candidate.map(|x| x.0),
            lease: Some(lease).filter(|x| *x != 0),
        }
    }

    pub fn seg_id(&self) -> SegId {
        SegId::new(self.volume_id, self.segment_index)
    }

    /// Rebuild the membership, checking its structural invariants.
    pub fn into_membership(
        self,
    ) -> Result<(SegId, SegmentMembership), InvalidMembership> {
        let seg_id = self.seg_id();

        if self.primary == 0 {
            return Err(InvalidMembership::new(format!(
                "{} wire membership has no primary",
                seg_id
            )));
        }

        let m = SegmentMembership::new(
            SegmentVersion::new(self.epoch, self.generation),
            InstanceId(self.primary),
            self.secondaries.into_iter().map(InstanceId),
        )
        .with_arbiters(self.arbiters.into_iter().map(InstanceId))
        .with_joining_secondaries(self.joining_secondaries.into_iter().map(InstanceId))
        .with_inactive_secondaries(
            self.inactive_secondaries.into_iter().map(InstanceId),
        )
        .with_temp_primary(optional(self.temp_primary))
        .with_secondary_candidate(optional(self.secondary_candidate))
        .with_primary_candidate(optional(self.primary_candidate));

        m.validate()?;
        Ok((seg_id, m))
    }
}
