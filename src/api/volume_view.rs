use std::collections::BTreeMap;

use crate::volume::SegmentMetadata;
use crate::volume::SegmentStatus;
use crate::volume::VolumeStatus;
use crate::Config;
use crate::VolumeType;

/// Read-only view of a volume, everything the volume state machines look at.
///
/// All timestamps are Unix-epoch milliseconds.
pub trait VolumeView {
    fn volume_id(&self) -> u64;

    fn name(&self) -> &str;

    fn volume_type(&self) -> VolumeType;

    fn volume_size(&self) -> u64;

    fn segment_size(&self) -> u64;

    /// Size being added by an extension in progress, 0 if none.
    fn extending_size(&self) -> u64;

    /// Reported segments, by segment index.
    fn segments(&self) -> &BTreeMap<u32, SegmentMetadata>;

    /// Reported segments of an extension in progress, by segment index.
    fn extend_segments(&self) -> &BTreeMap<u32, SegmentMetadata>;

    fn status(&self) -> VolumeStatus;

    fn created_ms(&self) -> u64;

    /// Time granted to data nodes to create their segment units, excluded
    /// from the creation timeouts.
    fn wait_to_create_unit_ms(&self) -> u64;

    fn last_extended_ms(&self) -> Option<u64>;

    fn last_fix_ms(&self) -> u64;

    /// Whether every segment has a full, healthy membership whose members all
    /// report in their role.
    fn is_stable(&self) -> bool;

    /// Number of segments the volume is made of, rounding up.
    fn expected_segment_count(&self) -> usize {
        div_ceil(self.volume_size(), self.segment_size())
    }

    fn expected_extend_segment_count(&self) -> usize {
        div_ceil(self.extending_size(), self.segment_size())
    }

    /// Number of whole segments in the volume, rounding down.
    fn whole_segment_count(&self) -> usize {
        self.volume_size()
            .checked_div(self.segment_size())
            .unwrap_or_default() as usize
    }

    fn all_segments_available(&self) -> bool {
        all_available(self.segments(), self.expected_segment_count())
    }

    fn all_extend_segments_available(&self) -> bool {
        all_available(self.extend_segments(), self.expected_extend_segment_count())
    }

    fn all_segments_deleting(&self) -> bool {
        self.segments().len() == self.whole_segment_count()
            && self.segments().values().all(|s| s.status == SegmentStatus::Deleting)
    }

    fn some_segment_dead(&self) -> bool {
        self.segments().values().any(|s| s.status == SegmentStatus::Dead)
    }

    /// Whether some segment has no unit reporting at all.
    fn some_segment_empty(&self) -> bool {
        self.segments().values().any(|s| s.is_empty())
    }

    fn to_be_created_timed_out(&self, config: &Config, now_ms: u64) -> bool {
        let elapsed = now_ms
            .saturating_sub(self.wait_to_create_unit_ms())
            .saturating_sub(self.created_ms());

        timed_out(self, "to-be-created", elapsed, config.volume_to_be_created_timeout_ms())
    }

    fn creating_timed_out(&self, config: &Config, now_ms: u64) -> bool {
        let elapsed = now_ms
            .saturating_sub(self.wait_to_create_unit_ms())
            .saturating_sub(self.created_ms());

        timed_out(self, "creating", elapsed, config.volume_creating_timeout_ms())
    }

    fn extend_timed_out(&self, config: &Config, now_ms: u64) -> bool {
        let Some(last_extended_ms) = self.last_extended_ms() else {
            return false;
        };

        let elapsed = now_ms
            .saturating_sub(self.wait_to_create_unit_ms())
            .saturating_sub(last_extended_ms);

        timed_out(self, "extend", elapsed, config.volume_creating_timeout_ms())
    }

    fn fix_timed_out(&self, config: &Config, now_ms: u64) -> bool {
        let elapsed = now_ms.saturating_sub(self.last_fix_ms());
        timed_out(self, "fix", elapsed, config.fix_volume_timeout_ms())
    }
}

fn div_ceil(size: u64, unit: u64) -> usize {
    if unit == 0 {
        return 0;
    }
    size.div_ceil(unit) as usize
}

fn all_available(segments: &BTreeMap<u32, SegmentMetadata>, expected: usize) -> bool {
    segments.len() == expected && segments.values().all(|s| s.status.available())
}

fn timed_out<V: VolumeView + ?Sized>(
    view: &V,
    what: &str,
    elapsed_ms: u64,
    timeout_ms: u64,
) -> bool {
    if elapsed_ms > timeout_ms {
        log::warn!(
            "volume {}({}) {} timeout: elapsed {} ms > {} ms",
            view.volume_id(),
            view.name(),
            what,
            elapsed_ms,
            timeout_ms
        );
        return true;
    }
    false
}
