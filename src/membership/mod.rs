//! Versioned role assignment of one segment's replica group.

pub(crate) mod codec;
pub(crate) mod compact;
pub(crate) mod helper;
pub(crate) mod io_status;
pub(crate) mod observed;
pub(crate) mod quorum;
pub(crate) mod segment_version;
pub(crate) mod transition;
pub(crate) mod wire;

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use crate::disp::DisplayIds;
use crate::disp::DisplayOption;
use crate::errors::InvalidMembership;
use crate::InstanceId;
use crate::SegmentVersion;
use crate::VolumeType;

/// Who plays which role in a segment's replica group, at one version.
///
/// A membership is a value: every transition returns a new snapshot and
/// leaves `self` untouched. A node appears in at most one of the four role
/// sets, and never in a set and as the primary at the same time.
#[derive(Debug, Clone, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(try_from = "RawMembership")]
pub struct SegmentMembership {
    pub(crate) version: SegmentVersion,

    pub(crate) primary: InstanceId,

    /// A secondary serving as primary while the primary is suspected to
    /// have failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) temp_primary: Option<InstanceId>,

    /// Fully synced, voting replicas.
    #[serde(default)]
    pub(crate) secondaries: BTreeSet<InstanceId>,

    /// Voting replicas without data.
    #[serde(default)]
    pub(crate) arbiters: BTreeSet<InstanceId>,

    /// Secondaries that are out of sync or unreachable.
    #[serde(default)]
    pub(crate) inactive_secondaries: BTreeSet<InstanceId>,

    /// Secondaries catching up with the primary.
    #[serde(default)]
    pub(crate) joining_secondaries: BTreeSet<InstanceId>,

    /// A node staged to replace a secondary-class member.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) secondary_candidate: Option<InstanceId>,

    /// A secondary staged to take over as primary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) primary_candidate: Option<InstanceId>,
}

/// The serialized fields of a [`SegmentMembership`], not yet validated.
#[derive(serde::Deserialize)]
pub(crate) struct RawMembership {
    version: SegmentVersion,
    primary: InstanceId,
    #[serde(default)]
    temp_primary: Option<InstanceId>,
    #[serde(default)]
    secondaries: BTreeSet<InstanceId>,
    #[serde(default)]
    arbiters: BTreeSet<InstanceId>,
    #[serde(default)]
    inactive_secondaries: BTreeSet<InstanceId>,
    #[serde(default)]
    joining_secondaries: BTreeSet<InstanceId>,
    #[serde(default)]
    secondary_candidate: Option<InstanceId>,
    #[serde(default)]
    primary_candidate: Option<InstanceId>,
}

impl TryFrom<RawMembership> for SegmentMembership {
    type Error = InvalidMembership;

    fn try_from(raw: RawMembership) -> Result<Self, Self::Error> {
        let m = Self {
            version: raw.version,
            primary: raw.primary,
            temp_primary: raw.temp_primary,
            secondaries: raw.secondaries,
            arbiters: raw.arbiters,
            inactive_secondaries: raw.inactive_secondaries,
            joining_secondaries: raw.joining_secondaries,
            secondary_candidate: raw.secondary_candidate,
            primary_candidate: raw.primary_candidate,
        };
        m.validate()?;
        Ok(m)
    }
}

impl SegmentMembership {
    /// Create a membership of a primary and its secondaries.
    pub fn new(
        version: SegmentVersion,
        primary: InstanceId,
        secondaries: impl IntoIterator<Item = InstanceId>,
    ) -> Self {
        Self {
            version,
            primary,
            temp_primary: None,
            secondaries: secondaries.into_iter().collect(),
            arbiters: BTreeSet::new(),
            inactive_secondaries: BTreeSet::new(),
            joining_secondaries: BTreeSet::new(),
            secondary_candidate: None,
            primary_candidate: None,
        }
    }

    pub fn with_arbiters(
        mut self,
        arbiters: impl IntoIterator<Item = InstanceId>,
    ) -> Self {
        self.arbiters = arbiters.into_iter().collect();
        self
    }

    pub fn with_inactive_secondaries(
        mut self,
        inactive: impl IntoIterator<Item = InstanceId>,
    ) -> Self {
        self.inactive_secondaries = inactive.into_iter().collect();
        self
    }

    pub fn with_joining_secondaries(
        mut self,
        joining: impl IntoIterator<Item = InstanceId>,
    ) -> Self {
        self.joining_secondaries = joining.into_iter().collect();
        self
    }

    pub fn with_temp_primary(mut self, id: Option<InstanceId>) -> Self {
        self.temp_primary = id;
        self
    }

    pub fn with_secondary_candidate(mut self, id: Option<InstanceId>) -> Self {
        self.secondary_candidate = id;
        self
    }

    pub fn with_primary_candidate(mut self, id: Option<InstanceId>) -> Self {
        self.primary_candidate = id;
        self
    }

    /// Check the structural invariants: the primary holds no other role, no
    /// node is in two role sets, the temp primary and the primary candidate
    /// are secondaries, and the secondary candidate is not yet a member.
    pub fn validate(&self) -> Result<(), InvalidMembership> {
        let sets = [
            ("secondaries", &self.secondaries),
            ("arbiters", &self.arbiters),
            ("inactive_secondaries", &self.inactive_secondaries),
            ("joining_secondaries", &self.joining_secondaries),
        ];

        for (i, (name, set)) in sets.iter().enumerate() {
            if set.contains(&self.primary) {
                return Err(InvalidMembership::new(format!(
                    "primary {} is also in {}",
                    self.primary, name
                )));
            }

            for (other_name, other) in sets.iter().skip(i + 1) {
                if let Some(id) = set.intersection(other).next() {
                    return Err(InvalidMembership::new(format!(
                        "{} is in both {} and {}",
                        id, name, other_name
                    )));
                }
            }
        }

        let staged = [
            ("temp primary", self.temp_primary),
            ("primary candidate", self.primary_candidate),
        ];
        for (name, id) in staged {
            if let Some(id) = id {
                if !self.secondaries.contains(&id) {
                    return Err(InvalidMembership::new(format!(
                        "{} {} is not a secondary",
                        name, id
                    )));
                }
            }
        }

        if let Some(c) = self.secondary_candidate {
            if self.is_member(c) {
                return Err(InvalidMembership::new(format!(
                    "secondary candidate {} is already a member",
                    c
                )));
            }
        }

        Ok(())
    }

    pub fn version(&self) -> SegmentVersion {
        self.version
    }

    pub fn primary(&self) -> InstanceId {
        self.primary
    }

    pub fn temp_primary(&self) -> Option<InstanceId> {
        self.temp_primary
    }

    pub fn secondary_candidate(&self) -> Option<InstanceId> {
        self.secondary_candidate
    }

    pub fn primary_candidate(&self) -> Option<InstanceId> {
        self.primary_candidate
    }

    pub fn secondaries(&self) -> &BTreeSet<InstanceId> {
        &self.secondaries
    }

    pub fn arbiters(&self) -> &BTreeSet<InstanceId> {
        &self.arbiters
    }

    pub fn inactive_secondaries(&self) -> &BTreeSet<InstanceId> {
        &self.inactive_secondaries
    }

    pub fn joining_secondaries(&self) -> &BTreeSet<InstanceId> {
        &self.joining_secondaries
    }

    /// Whether `id` takes any part in this group, the staged secondary
    /// candidate included.
    pub fn contains(&self, id: InstanceId) -> bool {
        self.is_member(id) || self.is_secondary_candidate(id)
    }

    /// Whether `id` is the primary or in one of the role sets.
    pub fn is_member(&self, id: InstanceId) -> bool {
        self.is_primary(id)
            || self.secondaries.contains(&id)
            || self.arbiters.contains(&id)
            || self.inactive_secondaries.contains(&id)
            || self.joining_secondaries.contains(&id)
    }

    pub fn is_primary(&self, id: InstanceId) -> bool {
        self.primary == id
    }

    pub fn is_temp_primary(&self, id: InstanceId) -> bool {
        self.temp_primary == Some(id)
    }

    pub fn is_secondary(&self, id: InstanceId) -> bool {
        self.secondaries.contains(&id)
    }

    pub fn is_arbiter(&self, id: InstanceId) -> bool {
        self.arbiters.contains(&id)
    }

    pub fn is_joining_secondary(&self, id: InstanceId) -> bool {
        self.joining_secondaries.contains(&id)
    }

    pub fn is_inactive_secondary(&self, id: InstanceId) -> bool {
        self.inactive_secondaries.contains(&id)
    }

    /// Secondaries and joining secondaries: the members still taking writes.
    pub fn is_alive_secondary(&self, id: InstanceId) -> bool {
        self.is_secondary(id) || self.is_joining_secondary(id)
    }

    pub fn is_secondary_candidate(&self, id: InstanceId) -> bool {
        self.secondary_candidate == Some(id)
    }

    pub fn is_primary_candidate(&self, id: InstanceId) -> bool {
        self.primary_candidate == Some(id)
    }

    /// The primary and every node in a role set.
    pub fn members(&self) -> BTreeSet<InstanceId> {
        let mut m = self.all_secondaries();
        m.insert(self.primary);
        m
    }

    /// Every node in a role set.
    pub fn all_secondaries(&self) -> BTreeSet<InstanceId> {
        union([
            &self.secondaries,
            &self.arbiters,
            &self.inactive_secondaries,
            &self.joining_secondaries,
        ])
    }

    /// Secondaries, arbiters and joining secondaries.
    pub fn alive_secondaries(&self) -> BTreeSet<InstanceId> {
        union([&self.secondaries, &self.arbiters, &self.joining_secondaries])
    }

    /// Secondaries and joining secondaries: the members data is written to.
    pub fn write_secondaries(&self) -> BTreeSet<InstanceId> {
        union([&self.secondaries, &self.joining_secondaries])
    }

    pub fn secondaries_and_arbiters(&self) -> BTreeSet<InstanceId> {
        union([&self.secondaries, &self.arbiters])
    }

    /// Members the primary sends heartbeats to: the alive secondaries and the
    /// secondary candidate.
    pub fn heartbeat_members(&self) -> BTreeSet<InstanceId> {
        let mut m = self.alive_secondaries();
        m.extend(self.secondary_candidate);
        m
    }

    /// Every member except `myself`.
    pub fn peer_instance_ids(&self, myself: InstanceId) -> BTreeSet<InstanceId> {
        let mut m = self.members();
        m.remove(&myself);
        m
    }

    /// Number of members, the primary and inactive secondaries included.
    pub fn size(&self) -> usize {
        self.alive_size() + self.inactive_secondaries.len()
    }

    /// Number of members, not counting inactive secondaries.
    pub fn alive_size(&self) -> usize {
        1 + self.secondaries.len()
            + self.arbiters.len()
            + self.joining_secondaries.len()
    }

    /// A new joining secondary is allowed only when secondaries are missing
    /// and nobody is joining yet.
    pub fn allow_new_joining_secondary(&self, total_secondaries: usize) -> bool {
        self.secondaries.len() < total_secondaries
            && self.joining_secondaries.is_empty()
    }

    pub fn all_secondaries_present(&self, volume_type: VolumeType) -> bool {
        self.secondaries.len() == volume_type.num_secondaries()
    }

    pub fn compare_version(&self, other: &Self) -> Ordering {
        self.version.cmp(&other.version)
    }

    /// Order two memberships of the same segment by version.
    ///
    /// Two different memberships must never share a version; meeting such a
    /// pair is an error.
    pub fn compare_to(&self, other: &Self) -> Result<Ordering, InvalidMembership> {
        if self == other {
            return Ok(Ordering::Equal);
        }

        match self.compare_version(other) {
            Ordering::Equal => Err(InvalidMembership::new(format!(
                "{} has the same version with {} but different members",
                self, other
            ))),
            ord => Ok(ord),
        }
    }

    pub fn has_same_epoch_lower_generation(&self, other: &Self) -> bool {
        self.version.epoch == other.version.epoch
            && self.version.generation < other.version.generation
    }

    pub fn has_same_epoch_higher_generation(&self, other: &Self) -> bool {
        self.version.epoch == other.version.epoch
            && self.version.generation > other.version.generation
    }
}

fn union<const N: usize>(
    sets: [&BTreeSet<InstanceId>; N],
) -> BTreeSet<InstanceId> {
    sets.into_iter().flatten().copied().collect()
}

impl fmt::Display for SegmentMembership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SegmentMembership{{{}, primary={}, temp_primary={}",
            self.version,
            self.primary,
            DisplayOption(self.temp_primary.as_ref())
        )?;

        let sets = [
            ("secondaries", &self.secondaries),
            ("arbiters", &self.arbiters),
            ("inactive_secondaries", &self.inactive_secondaries),
            ("joining_secondaries", &self.joining_secondaries),
        ];
        for (name, set) in sets {
            if !set.is_empty() {
                write!(f, ", {}={}", name, DisplayIds(set))?;
            }
        }

        if let Some(c) = self.secondary_candidate {
            write!(f, ", secondary_candidate={}", c)?;
        }
        if let Some(c) = self.primary_candidate {
            write!(f, ", primary_candidate={}", c)?;
        }

        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;
    use std::collections::BTreeSet;

    use pretty_assertions::assert_eq;

    use crate::errors::InvalidMembership;
    use crate::testing::id;
    use crate::testing::ids;
    use crate::testing::membership;
    use crate::InstanceId;
    use crate::SegmentMembership;
    use crate::SegmentVersion;
    use crate::VolumeType;

    fn sample() -> SegmentMembership {
        membership((1, 2), 1, &[2, 3])
            .with_arbiters(ids(&[4]))
            .with_inactive_secondaries(ids(&[5]))
            .with_joining_secondaries(ids(&[6]))
            .with_secondary_candidate(Some(id(7)))
    }

    fn set(xs: &[u64]) -> BTreeSet<InstanceId> {
        ids(xs).into_iter().collect()
    }

    #[test]
    fn test_role_queries() {
        let m = sample();

        assert!(m.is_primary(id(1)));
        assert!(m.is_secondary(id(2)));
        assert!(m.is_arbiter(id(4)));
        assert!(m.is_inactive_secondary(id(5)));
        assert!(m.is_joining_secondary(id(6)));
        assert!(m.is_alive_secondary(id(6)));
        assert!(!m.is_alive_secondary(id(5)));

        assert!(m.contains(id(7)));
        assert!(!m.is_member(id(7)));
        assert!(!m.contains(id(8)));

        assert_eq!(set(&[1, 2, 3, 4, 5, 6]), m.members());
        assert_eq!(set(&[2, 3, 4, 5, 6]), m.all_secondaries());
        assert_eq!(set(&[2, 3, 4, 6]), m.alive_secondaries());
        assert_eq!(set(&[2, 3, 6]), m.write_secondaries());
        assert_eq!(set(&[2, 3, 4]), m.secondaries_and_arbiters());
        assert_eq!(set(&[2, 3, 4, 6, 7]), m.heartbeat_members());
        assert_eq!(set(&[1, 3, 4, 5, 6]), m.peer_instance_ids(id(2)));

        assert_eq!(6, m.size());
        assert_eq!(5, m.alive_size());
    }

    #[test]
    fn test_joining_allowance() {
        let m = membership((0, 0), 1, &[2]);
        assert!(m.allow_new_joining_secondary(2));
        assert!(!m.allow_new_joining_secondary(1));
        assert!(!m.all_secondaries_present(VolumeType::Regular));
        assert!(m.all_secondaries_present(VolumeType::Small));

        let m = m.with_joining_secondaries(ids(&[3]));
        assert!(!m.allow_new_joining_secondary(2));
    }

    #[test]
    fn test_validate() {
        assert!(sample().validate().is_ok());

        let m = membership((0, 0), 1, &[1, 2]);
        assert!(m.validate().is_err());

        let m = membership((0, 0), 1, &[2]).with_arbiters(ids(&[2]));
        assert_eq!(
            "Invalid membership: 2 is in both secondaries and arbiters",
            m.validate().unwrap_err().to_string()
        );

        let m = membership((0, 0), 1, &[2]).with_secondary_candidate(Some(id(2)));
        assert!(m.validate().is_err());

        let m = membership((0, 0), 1, &[2])
            .with_inactive_secondaries(ids(&[3]))
            .with_temp_primary(Some(id(3)));
        assert_eq!(
            "Invalid membership: temp primary 3 is not a secondary",
            m.validate().unwrap_err().to_string()
        );

        let m = membership((0, 0), 1, &[2]).with_primary_candidate(Some(id(1)));
        assert_eq!(
            "Invalid membership: primary candidate 1 is not a secondary",
            m.validate().unwrap_err().to_string()
        );

        let m = membership((0, 0), 1, &[2, 3])
            .with_temp_primary(Some(id(2)))
            .with_primary_candidate(Some(id(3)));
        assert!(m.validate().is_ok());
    }

    #[test]
    fn test_compare() -> Result<(), InvalidMembership> {
        let a = membership((1, 2), 1, &[2, 3]);
        let b = membership((1, 3), 1, &[2]);
        let c = membership((1, 2), 1, &[2]);

        assert_eq!(Ordering::Less, a.compare_to(&b)?);
        assert_eq!(Ordering::Greater, b.compare_to(&a)?);
        assert_eq!(Ordering::Equal, a.compare_to(&a.clone())?);
        assert!(a.compare_to(&c).is_err());

        assert!(a.has_same_epoch_lower_generation(&b));
        assert!(b.has_same_epoch_higher_generation(&a));

        let d = membership((2, 0), 2, &[1]);
        assert!(!a.has_same_epoch_lower_generation(&d));
        assert_eq!(Ordering::Less, a.compare_version(&d));
        Ok(())
    }

    #[test]
    fn test_display() {
        assert_eq!(
            "SegmentMembership{SegmentVersion(epoch=1, generation=2), primary=1, temp_primary=None, \
            secondaries=[2, 3], arbiters=[4], inactive_secondaries=[5], joining_secondaries=[6], \
            secondary_candidate=7}",
            sample().to_string()
        );

        let m = SegmentMembership::new(SegmentVersion::default(), id(1), Vec::new())
            .with_temp_primary(Some(id(9)))
            .with_primary_candidate(Some(id(3)));
        assert_eq!(
            "SegmentMembership{SegmentVersion(epoch=0, generation=0), primary=1, temp_primary=9, \
            primary_candidate=3}",
            m.to_string()
        );
    }
}
