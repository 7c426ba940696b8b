use std::collections::BTreeMap;
use std::fmt;

use crate::errors::InvalidMembership;
use crate::errors::NotAMember;
use crate::types::RequestId;
use crate::InstanceId;
use crate::MemberIoStatus;
use crate::SegmentMembership;

/// A membership snapshot together with the IO status observed for each of
/// its members.
///
/// The IO status overlay never changes the membership version. It is built
/// fresh for every new structural membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedMembership {
    membership: SegmentMembership,
    io_status: BTreeMap<InstanceId, MemberIoStatus>,
}

impl ObservedMembership {
    /// Start observing `membership`, every member at the healthy status of its
    /// structural role.
    pub fn new(membership: SegmentMembership) -> Self {
        let mut io_status = BTreeMap::new();

        for id in membership.members() {
            if let Some(status) = Self::initial_status(&membership, id) {
                io_status.insert(id, status);
            }
        }

        Self {
            membership,
            io_status,
        }
    }

    fn initial_status(
        membership: &SegmentMembership,
        id: InstanceId,
    ) -> Option<MemberIoStatus> {
        let status = if membership.is_primary(id) {
            MemberIoStatus::Primary
        } else if membership.is_temp_primary(id) {
            MemberIoStatus::TempPrimary
        } else if membership.is_secondary(id) {
            MemberIoStatus::Secondary
        } else if membership.is_joining_secondary(id) {
            MemberIoStatus::JoiningSecondary
        } else if membership.is_arbiter(id) {
            MemberIoStatus::Arbiter
        } else if membership.is_inactive_secondary(id) {
            MemberIoStatus::InactiveSecondary
        } else {
            return None;
        };
        Some(status)
    }

    pub fn membership(&self) -> &SegmentMembership {
        &self.membership
    }

    pub fn into_membership(self) -> SegmentMembership {
        self.membership
    }

    pub fn io_status(&self, id: InstanceId) -> Option<MemberIoStatus> {
        self.io_status.get(&id).copied()
    }

    pub fn io_statuses(&self) -> &BTreeMap<InstanceId, MemberIoStatus> {
        &self.io_status
    }

    /// Mark member `id` as `status`.
    ///
    /// Returns whether the status was applied; a move that would make the
    /// member look healthier, or cross roles, is ignored.
    pub fn mark_member_io_status(
        &mut self,
        id: InstanceId,
        status: MemberIoStatus,
    ) -> Result<bool, NotAMember> {
        let Some(current) = self.io_status.get_mut(&id) else {
            return Err(NotAMember::new(id, "mark_member_io_status"));
        };

        if !current.can_move_to(status) {
            log::warn!(
                "member {} in {} can not move from {} to {}",
                id,
                self.membership,
                current,
                status
            );
            return Ok(false);
        }

        *current = status;
        Ok(true)
    }

    /// Merge a peer's observation of the same membership into this one,
    /// taking the worse status of every member.
    ///
    /// `request_id` identifies the IO request the peer's view came with and
    /// is only logged. Merging is idempotent. Inactive secondaries are
    /// skipped: they are down in every observation.
    pub fn merge_member_status(
        &mut self,
        request_id: RequestId,
        other: &ObservedMembership,
    ) -> Result<(), InvalidMembership> {
        if self.membership != other.membership {
            return Err(InvalidMembership::new(format!(
                "can not merge io status of {} into {}",
                other.membership, self.membership
            )));
        }

        for (id, other_status) in other.io_status.iter() {
            if self.membership.is_inactive_secondary(*id) {
                continue;
            }

            let Some(current) = self.io_status.get_mut(id) else {
                continue;
            };

            let merged = current.merge(*other_status);
            if merged != *current {
                log::warn!(
                    "request {}: membership {} member {} io status {} -> {}, peer saw {}",
                    request_id,
                    self.membership,
                    id,
                    current,
                    merged,
                    other_status
                );
                *current = merged;
            }
        }

        Ok(())
    }
}

impl fmt::Display for ObservedMembership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} io_status={{", self.membership)?;
        for (i, (id, status)) in self.io_status.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}:{}", id, status)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::errors::MembershipError;
    use crate::testing::id;
    use crate::testing::ids;
    use crate::testing::membership;
    use crate::MemberIoStatus;
    use crate::ObservedMembership;

    fn observed() -> ObservedMembership {
        ObservedMembership::new(
            membership((2, 3), 1, &[2, 3])
                .with_arbiters(ids(&[4]))
                .with_inactive_secondaries(ids(&[5]))
                .with_temp_primary(Some(id(3))),
        )
    }

    #[test]
    fn test_initial_status() {
        let o = observed();

        assert_eq!(Some(MemberIoStatus::Primary), o.io_status(id(1)));
        assert_eq!(Some(MemberIoStatus::Secondary), o.io_status(id(2)));
        assert_eq!(Some(MemberIoStatus::TempPrimary), o.io_status(id(3)));
        assert_eq!(Some(MemberIoStatus::Arbiter), o.io_status(id(4)));
        assert_eq!(Some(MemberIoStatus::InactiveSecondary), o.io_status(id(5)));
        assert_eq!(None, o.io_status(id(6)));

        assert_eq!(
            "SegmentMembership{SegmentVersion(epoch=2, generation=3), primary=1, temp_primary=3, \
            secondaries=[2, 3], arbiters=[4], inactive_secondaries=[5]} \
            io_status={1:Primary, 2:Secondary, 3:TempPrimary, 4:Arbiter, 5:InactiveSecondary}",
            o.to_string()
        );
    }

    #[test]
    fn test_mark_member_io_status() -> Result<(), MembershipError> {
        let mut o = observed();

        assert!(o.mark_member_io_status(id(2), MemberIoStatus::SecondaryDown)?);
        assert!(!o.mark_member_io_status(id(2), MemberIoStatus::Secondary)?);
        assert_eq!(Some(MemberIoStatus::SecondaryDown), o.io_status(id(2)));

        assert!(!o.mark_member_io_status(id(4), MemberIoStatus::PrimaryDown)?);
        assert!(o.mark_member_io_status(id(9), MemberIoStatus::Arbiter).is_err());

        Ok(())
    }

    #[test]
    fn test_merge_member_status() -> Result<(), MembershipError> {
        let mut a = observed();
        let mut b = observed();

        b.mark_member_io_status(id(1), MemberIoStatus::PrimaryDown)?;
        b.mark_member_io_status(id(4), MemberIoStatus::ArbiterDown)?;
        a.mark_member_io_status(id(2), MemberIoStatus::SecondaryReadDown)?;

        let version = a.membership().version();
        a.merge_member_status(7, &b)?;

        assert_eq!(Some(MemberIoStatus::PrimaryDown), a.io_status(id(1)));
        assert_eq!(Some(MemberIoStatus::SecondaryReadDown), a.io_status(id(2)));
        assert_eq!(Some(MemberIoStatus::ArbiterDown), a.io_status(id(4)));
        assert_eq!(version, a.membership().version());

        let snapshot = a.clone();
        a.merge_member_status(8, &b)?;
        assert_eq!(snapshot, a);

        Ok(())
    }

    #[test]
    fn test_merge_requires_same_membership() {
        let mut a = observed();
        let b = ObservedMembership::new(membership((2, 4), 1, &[2, 3]));

        assert!(a.merge_member_status(1, &b).is_err());
    }
}
