//! Write-quorum decisions.
//!
//! The primary's own acknowledgement is implicit, so a write needs
//! `write_quorum_size - 1` more acknowledgements. They are collected in
//! priority order: secondaries, then joining secondaries, then arbiters. A
//! higher-priority category that has members must be covered, up to what the
//! quorum still needs, before a lower one may count.

use std::cmp::min;

use crate::SegmentMembership;

impl SegmentMembership {
    /// Secondaries that are expected to acknowledge a write. A serving temp
    /// primary is one of the secondaries but acts for the primary.
    fn quorum_secondaries(&self) -> usize {
        let tp = usize::from(self.temp_primary.is_some());
        self.secondaries.len().saturating_sub(tp)
    }

    /// Whether a write acknowledged by `good_secondaries`, `good_joining` and
    /// `good_arbiters` members, plus the primary, is durable.
    pub fn check_write_result(
        &self,
        write_quorum_size: usize,
        good_secondaries: usize,
        good_joining: usize,
        good_arbiters: usize,
    ) -> bool {
        let q = write_quorum_size.saturating_sub(1);

        if good_secondaries < min(q, self.quorum_secondaries()) {
            return false;
        }
        if good_secondaries >= q {
            return true;
        }

        let still_needed = q - good_secondaries;
        if good_joining < min(still_needed, self.joining_secondaries.len()) {
            return false;
        }
        if good_secondaries + good_joining >= q {
            return true;
        }

        good_secondaries + good_joining + good_arbiters >= q
    }

    /// Whether a write is certainly lost, given the members that already
    /// failed it: even if every remaining member acknowledges, the quorum
    /// cannot be reached.
    ///
    /// Bad counts larger than the populated role sets clamp the good counts
    /// at zero instead of going negative.
    pub fn check_bad_write_result(
        &self,
        write_quorum_size: usize,
        bad_secondaries: usize,
        bad_joining: usize,
        bad_arbiters: usize,
    ) -> bool {
        let good_secondaries =
            self.quorum_secondaries().saturating_sub(bad_secondaries);
        let good_joining =
            self.joining_secondaries.len().saturating_sub(bad_joining);
        let good_arbiters = self.arbiters.len().saturating_sub(bad_arbiters);

        !self.check_write_result(
            write_quorum_size,
            good_secondaries,
            good_joining,
            good_arbiters,
        )
    }
}
