use std::fmt;
use std::str::FromStr;

use crate::errors::ShapeError;
use crate::errors::UnknownName;
use crate::SegmentForm;
use crate::SegmentMembership;

/// Replication scheme of a volume: how many members a segment has, how many of
/// them are data-holding secondaries and how many acknowledgements a write or
/// a vote needs.
///
/// The number of arbiters is implied: every member that is neither the
/// primary nor a secondary is an arbiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VolumeType {
    /// Primary plus two secondaries.
    #[default]
    Regular,

    /// Primary, one secondary and one arbiter.
    Small,

    /// Primary, two secondaries and two arbiters.
    Large,
}

impl VolumeType {
    pub const ALL: [VolumeType; 3] =
        [VolumeType::Regular, VolumeType::Small, VolumeType::Large];

    /// `(members, secondaries, write quorum, voting quorum)`
    const fn params(&self) -> (usize, usize, usize, usize) {
        match self {
            VolumeType::Regular => (3, 2, 2, 2),
            VolumeType::Small => (3, 1, 2, 2),
            VolumeType::Large => (5, 2, 3, 3),
        }
    }

    pub const fn num_members(&self) -> usize {
        self.params().0
    }

    pub const fn num_secondaries(&self) -> usize {
        self.params().1
    }

    pub const fn num_arbiters(&self) -> usize {
        self.num_members() - self.num_secondaries() - 1
    }

    /// Number of acknowledgements, the primary's included, a write needs to
    /// be durable.
    pub const fn write_quorum_size(&self) -> usize {
        self.params().2
    }

    pub const fn voting_quorum_size(&self) -> usize {
        self.params().3
    }

    /// Numeric id of the scheme as used by the transport layer.
    pub const fn value(&self) -> u8 {
        match self {
            VolumeType::Regular => 1,
            VolumeType::Small => 2,
            VolumeType::Large => 3,
        }
    }

    pub fn from_value(value: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.value() == value)
    }

    /// Check the scheme is self-consistent: the secondaries fit in the member
    /// count and a write quorum is at least a voting quorum.
    pub fn validate(&self) -> bool {
        let (members, secondaries, write, voting) = self.params();
        secondaries < members && write >= voting
    }

    /// Classify `membership` under this scheme.
    pub fn segment_form(
        &self,
        membership: &SegmentMembership,
    ) -> Result<SegmentForm, ShapeError> {
        SegmentForm::classify(membership, *self)
    }
}

impl fmt::Display for VolumeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VolumeType::Regular => "REGULAR",
            VolumeType::Small => "SMALL",
            VolumeType::Large => "LARGE",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for VolumeType {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "REGULAR" => Ok(VolumeType::Regular),
            "SMALL" => Ok(VolumeType::Small),
            "LARGE" => Ok(VolumeType::Large),
            _ => Err(UnknownName::new("volume type", s)),
        }
    }
}
