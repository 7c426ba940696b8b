use std::collections::BTreeMap;
use std::fmt;

use log::debug;

use crate::api::volume_view::VolumeView;
use crate::volume::SegmentMetadata;
use crate::volume::SegmentUnitStatus;
use crate::volume::VolumeExtendStatus;
use crate::volume::VolumeInAction;
use crate::volume::VolumeStatus;
use crate::VolumeType;

/// Owned snapshot of one volume.
///
/// Snapshots are not mutated while shared: a change builds a new snapshot
/// that replaces the old one, see [`VolumeSlot`](crate::volume::VolumeSlot).
#[derive(Debug, Clone, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct VolumeMetadata {
    pub(crate) volume_id: u64,
    pub(crate) name: String,
    pub(crate) volume_type: VolumeType,
    pub(crate) volume_size: u64,
    pub(crate) segment_size: u64,
    pub(crate) extending_size: u64,

    pub(crate) segments: BTreeMap<u32, SegmentMetadata>,
    pub(crate) extend_segments: BTreeMap<u32, SegmentMetadata>,

    pub(crate) created_ms: u64,
    pub(crate) wait_to_create_unit_ms: u64,
    pub(crate) last_extended_ms: Option<u64>,
    pub(crate) last_fix_ms: u64,

    pub(crate) status: VolumeStatus,
    pub(crate) extend_status: VolumeExtendStatus,
    pub(crate) in_action: VolumeInAction,

    /// Bumped every time a recompute changes the snapshot.
    pub(crate) version: u64,
}

impl VolumeMetadata {
    pub fn new(
        volume_id: u64,
        name: impl ToString,
        volume_type: VolumeType,
        volume_size: u64,
        segment_size: u64,
        created_ms: u64,
    ) -> Self {
        Self {
            volume_id,
            name: name.to_string(),
            volume_type,
            volume_size,
            segment_size,
            extending_size: 0,
            segments: BTreeMap::new(),
            extend_segments: BTreeMap::new(),
            created_ms,
            wait_to_create_unit_ms: 0,
            last_extended_ms: None,
            last_fix_ms: 0,
            status: VolumeStatus::ToBeCreated,
            extend_status: VolumeExtendStatus::ToBeCreated,
            in_action: VolumeInAction::Null,
            version: 0,
        }
    }

    pub fn with_wait_to_create_unit_ms(mut self, ms: u64) -> Self {
        self.wait_to_create_unit_ms = ms;
        self
    }

    pub fn with_status(mut self, status: VolumeStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_in_action(mut self, in_action: VolumeInAction) -> Self {
        self.in_action = in_action;
        self
    }

    pub fn extend_status(&self) -> VolumeExtendStatus {
        self.extend_status
    }

    pub fn in_action(&self) -> VolumeInAction {
        self.in_action
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn set_status(&mut self, status: VolumeStatus) {
        self.status = status;
    }

    pub fn set_in_action(&mut self, in_action: VolumeInAction) {
        self.in_action = in_action;
    }

    pub fn put_segment(&mut self, index: u32, segment: SegmentMetadata) {
        self.segments.insert(index, segment);
    }

    pub fn put_extend_segment(&mut self, index: u32, segment: SegmentMetadata) {
        self.extend_segments.insert(index, segment);
    }

    /// Start extending the volume by `extending_size` bytes.
    pub fn start_extend(&mut self, extending_size: u64, now_ms: u64) {
        self.extending_size = extending_size;
        self.last_extended_ms = Some(now_ms);
        self.extend_status = VolumeExtendStatus::ToBeCreated;
        self.in_action = VolumeInAction::Extending;
    }

    /// Merge the segments of a finished extension into the segment table and
    /// grow the volume.
    pub fn finish_extend(&mut self) {
        log::info!(
            "volume {}({}) extended by {} with {} segments",
            self.volume_id,
            self.name,
            self.extending_size,
            self.extend_segments.len()
        );

        self.segments.append(&mut self.extend_segments);
        self.volume_size += self.extending_size;
        self.extending_size = 0;
    }

    /// Drop the segments of a failed extension.
    pub fn abort_extend(&mut self) {
        log::warn!(
            "volume {}({}) extension of {} failed, drop {} segments",
            self.volume_id,
            self.name,
            self.extending_size,
            self.extend_segments.len()
        );

        self.extend_segments.clear();
        self.extending_size = 0;
    }

    pub fn mark_last_fix(&mut self, now_ms: u64) {
        self.last_fix_ms = now_ms;
    }

    /// Re-derive the status of every segment from its unit reports.
    pub fn refresh_segment_statuses(&mut self) {
        let volume_type = self.volume_type;
        for seg in self.segments.values_mut().chain(self.extend_segments.values_mut()) {
            seg.status = seg.derive_status(volume_type);
        }
    }

    pub fn can_be_recycled(&self) -> bool {
        self.status == VolumeStatus::Deleted
    }

    pub fn is_recycling(&self) -> bool {
        self.status == VolumeStatus::Recycling
    }

    fn unstable(&self, index: u32, reason: impl fmt::Display) -> bool {
        debug!(
            "volume {}({}) not stable, segment {}: {}",
            self.volume_id, self.name, index, reason
        );
        false
    }

    fn segment_is_stable(&self, index: u32, seg: &SegmentMetadata) -> bool {
        let Some(m) = seg.highest_membership() else {
            return self.unstable(index, "no membership");
        };

        if m.size() < 3 {
            return self.unstable(index, format_args!("membership too small: {}", m));
        }

        match seg.units.get(&m.primary()) {
            Some(u) if u.status == SegmentUnitStatus::Primary => {}
            Some(u) => {
                return self.unstable(index, format_args!("primary unit is {}", u.status));
            }
            None => return self.unstable(index, "primary unit absent"),
        }

        if !m.joining_secondaries().is_empty() {
            return self.unstable(index, "joining secondaries present");
        }
        if !m.inactive_secondaries().is_empty() {
            return self.unstable(index, "inactive secondaries present");
        }

        for id in m.all_secondaries() {
            match seg.units.get(&id) {
                Some(u)
                    if u.status == SegmentUnitStatus::Secondary
                        || u.status == SegmentUnitStatus::Arbiter => {}
                Some(u) => {
                    return self.unstable(
                        index,
                        format_args!("unit {} is {}", id, u.status),
                    );
                }
                None => return self.unstable(index, format_args!("unit {} absent", id)),
            }
        }

        if !seg.status.is_stable() {
            return self.unstable(index, format_args!("segment is {}", seg.status));
        }

        let members = self.volume_type.num_members();
        if let Some(u) = seg.units.values().find(|u| u.membership.size() != members) {
            return self.unstable(
                index,
                format_args!("unit membership is not full: {}", u.membership),
            );
        }

        true
    }
}

impl VolumeView for VolumeMetadata {
    fn volume_id(&self) -> u64 {
        self.volume_id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn volume_type(&self) -> VolumeType {
        self.volume_type
    }

    fn volume_size(&self) -> u64 {
        self.volume_size
    }

    fn segment_size(&self) -> u64 {
        self.segment_size
    }

    fn extending_size(&self) -> u64 {
        self.extending_size
    }

    fn segments(&self) -> &BTreeMap<u32, SegmentMetadata> {
        &self.segments
    }

    fn extend_segments(&self) -> &BTreeMap<u32, SegmentMetadata> {
        &self.extend_segments
    }

    fn status(&self) -> VolumeStatus {
        self.status
    }

    fn created_ms(&self) -> u64 {
        self.created_ms
    }

    fn wait_to_create_unit_ms(&self) -> u64 {
        self.wait_to_create_unit_ms
    }

    fn last_extended_ms(&self) -> Option<u64> {
        self.last_extended_ms
    }

    fn last_fix_ms(&self) -> u64 {
        self.last_fix_ms
    }

    fn is_stable(&self) -> bool {
        if !self.status.is_available() {
            return false;
        }

        if self.segments.len() != self.whole_segment_count() {
            debug!(
                "volume {}({}) not stable: {} of {} segments",
                self.volume_id,
                self.name,
                self.segments.len(),
                self.whole_segment_count()
            );
            return false;
        }

        self.segments.iter().all(|(index, seg)| self.segment_is_stable(*index, seg))
    }
}

impl fmt::Display for VolumeMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Volume{{id={}, name={}, type={}, size={}/{}, segments={}, status={}, extend_status={}, in_action={}, version={}}}",
            self.volume_id,
            self.name,
            self.volume_type,
            self.volume_size,
            self.segment_size,
            self.segments.len(),
            self.status,
            self.extend_status,
            self.in_action,
            self.version
        )
    }
}
