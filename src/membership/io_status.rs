use std::fmt;
use std::str::FromStr;

use crate::errors::UnknownName;

/// IO liveness of one member, as observed by the primary or a peer.
///
/// Statuses only ever get worse within one membership version: a member can
/// go down but not come back up until the structural membership changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum MemberIoStatus {
    Primary,
    Secondary,
    JoiningSecondary,
    Arbiter,
    PrimaryDown,
    SecondaryDown,
    JoiningSecondaryDown,
    ArbiterDown,
    InactiveSecondary,
    ExternalMember,
    TempPrimary,
    UnstablePrimary,
    /// A secondary that still takes writes but can not serve reads.
    SecondaryReadDown,
}

/// The structural role a status belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Primary,
    Secondary,
    Joining,
    Arbiter,
}

use MemberIoStatus::*;

impl MemberIoStatus {
    pub const ALL: [MemberIoStatus; 13] = [
        Primary,
        Secondary,
        JoiningSecondary,
        Arbiter,
        PrimaryDown,
        SecondaryDown,
        JoiningSecondaryDown,
        ArbiterDown,
        InactiveSecondary,
        ExternalMember,
        TempPrimary,
        UnstablePrimary,
        SecondaryReadDown,
    ];

    fn role(&self) -> Option<Role> {
        match self {
            Primary | PrimaryDown | UnstablePrimary => Some(Role::Primary),
            Secondary | SecondaryDown | TempPrimary | SecondaryReadDown => {
                Some(Role::Secondary)
            }
            JoiningSecondary | JoiningSecondaryDown => Some(Role::Joining),
            Arbiter | ArbiterDown => Some(Role::Arbiter),
            InactiveSecondary | ExternalMember => None,
        }
    }

    fn role_down(role: Role) -> Self {
        match role {
            Role::Primary => PrimaryDown,
            Role::Secondary => SecondaryDown,
            Role::Joining => JoiningSecondaryDown,
            Role::Arbiter => ArbiterDown,
        }
    }

    pub fn is_primary(&self) -> bool {
        self.role() == Some(Role::Primary)
    }

    pub fn is_secondary(&self) -> bool {
        self.role() == Some(Role::Secondary)
    }

    pub fn is_joining_secondary(&self) -> bool {
        self.role() == Some(Role::Joining)
    }

    pub fn is_arbiter(&self) -> bool {
        self.role() == Some(Role::Arbiter)
    }

    pub fn is_read_down(&self) -> bool {
        self.down_count() >= 1
    }

    pub fn is_write_down(&self) -> bool {
        self.down_count() == 2
    }

    /// Whether the member can neither serve reads nor take writes.
    pub fn is_down(&self) -> bool {
        self.is_write_down()
    }

    /// How many of read and write this status has lost.
    fn down_count(&self) -> u8 {
        match self {
            PrimaryDown | SecondaryDown | JoiningSecondaryDown | ArbiterDown
            | InactiveSecondary | ExternalMember => 2,
            SecondaryReadDown => 1,
            Primary | Secondary | JoiningSecondary | Arbiter | TempPrimary
            | UnstablePrimary => 0,
        }
    }

    fn same_role(&self, other: &Self) -> bool {
        self.role().is_some() && self.role() == other.role()
    }

    /// Whether a member in this status may be marked as `next`.
    ///
    /// Only moves within the same role that do not make the member look
    /// healthier are allowed.
    pub fn can_move_to(&self, next: MemberIoStatus) -> bool {
        if !self.same_role(&next) {
            return false;
        }

        let (cur, nxt) = (self.down_count(), next.down_count());
        nxt > cur || (nxt == cur && nxt != 1)
    }

    /// Combine this status with another observation of the same member,
    /// keeping the worse one.
    pub fn merge(&self, other: MemberIoStatus) -> MemberIoStatus {
        if !self.same_role(&other) || self.is_down() {
            return *self;
        }

        let (cur, oth) = (self.down_count(), other.down_count());

        if oth > cur {
            return other;
        }
        if oth < cur || cur == 0 || *self == other {
            return *self;
        }

        // Both lost one of read or write in different ways.
        self.role().map(Self::role_down).unwrap_or(*self)
    }
}

impl fmt::Display for MemberIoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl FromStr for MemberIoStatus {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|x| x.to_string() == s)
            .ok_or_else(|| UnknownName::new("member io status", s))
    }
}
