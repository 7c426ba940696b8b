use std::collections::BTreeMap;
use std::fmt;

use crate::InstanceId;
use crate::SegmentMembership;
use crate::VolumeType;

/// Availability of one segment, aggregated from the reports of its units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum SegmentStatus {
    /// Every member is up in its role.
    Healthy,
    /// Some members are absent but a voting quorum is up.
    Degraded,
    /// Like `Degraded`, with a member catching up.
    Recovering,
    Unavailable,
    Deleting,
    Dead,
    /// Writes are still accepted although a voting quorum is not up.
    Writable,
}

impl SegmentStatus {
    pub fn value(&self) -> u8 {
        match self {
            SegmentStatus::Healthy => 1,
            SegmentStatus::Degraded => 2,
            SegmentStatus::Recovering => 3,
            SegmentStatus::Unavailable => 4,
            SegmentStatus::Deleting => 5,
            SegmentStatus::Dead => 6,
            SegmentStatus::Writable => 7,
        }
    }

    pub fn available(&self) -> bool {
        matches!(
            self,
            SegmentStatus::Healthy
                | SegmentStatus::Degraded
                | SegmentStatus::Recovering
                | SegmentStatus::Writable
        )
    }

    pub fn is_stable(&self) -> bool {
        *self == SegmentStatus::Healthy
    }
}

impl fmt::Display for SegmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Lifecycle status a segment unit reports for itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum SegmentUnitStatus {
    Start,
    ModeratorSelected,
    SecondaryEnrolled,
    SecondaryApplicant,
    PreSecondary,
    PreArbiter,
    PrePrimary,
    Secondary,
    Arbiter,
    Primary,
    Offlining,
    Offlined,
    Deleting,
    Deleted,
    Broken,
    Unknown,
}

impl fmt::Display for SegmentUnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// What one unit of a segment last reported: its own status and the
/// membership it believes in.
#[derive(Debug, Clone, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct SegmentUnitReport {
    pub status: SegmentUnitStatus,
    pub membership: SegmentMembership,
}

impl SegmentUnitReport {
    pub fn new(status: SegmentUnitStatus, membership: SegmentMembership) -> Self {
        Self { status, membership }
    }
}

/// One segment of a volume: its aggregated status and the unit reports it
/// was aggregated from.
#[derive(Debug, Clone, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct SegmentMetadata {
    pub status: SegmentStatus,

    #[serde(default)]
    pub units: BTreeMap<InstanceId, SegmentUnitReport>,
}

#[derive(Debug, Default)]
struct UnitCounts {
    available_primary: usize,
    available_secondary: usize,
    available_arbiter: usize,
    available_joining: usize,
    deleting_primary: usize,
    deleting_secondary: usize,
    deleted_primary: usize,
    deleted_secondary: usize,
}

impl SegmentMetadata {
    pub fn new(status: SegmentStatus) -> Self {
        Self {
            status,
            units: BTreeMap::new(),
        }
    }

    /// Build a segment from unit reports, deriving its status.
    pub fn from_units(
        volume_type: VolumeType,
        units: impl IntoIterator<Item = (InstanceId, SegmentUnitReport)>,
    ) -> Self {
        let mut seg = Self::new(SegmentStatus::Unavailable);
        seg.units = units.into_iter().collect();
        seg.status = seg.derive_status(volume_type);
        seg
    }

    pub fn with_unit(mut self, id: InstanceId, report: SegmentUnitReport) -> Self {
        self.units.insert(id, report);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// The highest membership reported by any unit.
    pub fn highest_membership(&self) -> Option<&SegmentMembership> {
        self.units.values().map(|u| &u.membership).max_by_key(|m| m.version())
    }

    /// Aggregate the reports of the units that are members of the highest
    /// membership into a segment status.
    pub fn derive_status(&self, volume_type: VolumeType) -> SegmentStatus {
        let Some(highest) = self.highest_membership() else {
            return SegmentStatus::Unavailable;
        };

        let mut member_ids = highest.alive_secondaries();
        member_ids.insert(highest.primary());

        let mut c = UnitCounts::default();

        for id in member_ids {
            let Some(unit) = self.units.get(&id) else {
                continue;
            };
            Self::count_unit(&mut c, id, unit);
        }

        log::debug!("derive segment status from unit counts: {:?}", c);

        let voting_rest = volume_type.voting_quorum_size() - 1;

        if c.available_primary + c.available_secondary + c.available_arbiter
            == volume_type.num_members()
        {
            SegmentStatus::Healthy
        } else if c.available_primary == 1
            && c.available_secondary + c.available_arbiter + c.available_joining
                >= voting_rest
        {
            if c.available_joining > 0 {
                SegmentStatus::Recovering
            } else {
                SegmentStatus::Degraded
            }
        } else if c.deleting_primary >= 1 && c.deleting_secondary >= voting_rest {
            SegmentStatus::Deleting
        } else if c.deleted_primary + c.deleted_secondary
            >= volume_type.write_quorum_size()
        {
            SegmentStatus::Dead
        } else {
            SegmentStatus::Unavailable
        }
    }

    fn count_unit(c: &mut UnitCounts, id: InstanceId, unit: &SegmentUnitReport) {
        use SegmentUnitStatus as U;

        let m = &unit.membership;

        match unit.status {
            U::Primary if m.is_primary(id) => c.available_primary += 1,
            U::PrePrimary if m.is_primary(id) => c.available_secondary += 1,
            U::Secondary if m.is_secondary(id) => c.available_secondary += 1,
            U::Arbiter if m.is_arbiter(id) => c.available_arbiter += 1,
            U::Deleting => {
                if m.is_primary(id) {
                    c.deleting_primary += 1;
                } else if m.is_alive_secondary(id) || m.is_arbiter(id) {
                    c.deleting_secondary += 1;
                }
            }
            U::Deleted => {
                if m.is_primary(id) {
                    c.deleted_primary += 1;
                } else if m.is_alive_secondary(id) || m.is_arbiter(id) {
                    c.deleted_secondary += 1;
                }
            }
            U::Offlining | U::Offlined | U::Unknown | U::Broken => {}
            U::ModeratorSelected
            | U::SecondaryEnrolled
            | U::SecondaryApplicant
            | U::PreArbiter
                if m.is_arbiter(id) =>
            {
                c.available_joining += 1
            }
            U::ModeratorSelected
            | U::SecondaryEnrolled
            | U::SecondaryApplicant
            | U::PreSecondary
            | U::Secondary
                if m.is_joining_secondary(id) =>
            {
                c.available_joining += 1
            }
            _ => {}
        }
    }
}
