use std::fmt;
use std::str::FromStr;

use crate::api::volume_view::VolumeView;
use crate::errors::UnknownName;
use crate::Config;

/// Lifecycle status of a volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum VolumeStatus {
    ToBeCreated,
    Creating,
    Available,
    Unavailable,
    Deleting,
    Deleted,
    Recycling,
    Fixing,
    Dead,
    /// Available, with every segment healthy and fully staffed.
    Stable,
}

use VolumeStatus::*;

impl VolumeStatus {
    pub const ALL: [VolumeStatus; 10] = [
        ToBeCreated,
        Creating,
        Available,
        Unavailable,
        Deleting,
        Deleted,
        Recycling,
        Fixing,
        Dead,
        Stable,
    ];

    pub fn value(&self) -> u8 {
        match self {
            ToBeCreated => 1,
            Creating => 2,
            Available => 3,
            Unavailable => 4,
            Deleting => 5,
            Deleted => 6,
            Recycling => 7,
            Fixing => 8,
            Dead => 9,
            Stable => 10,
        }
    }

    pub fn from_value(value: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|x| x.value() == value)
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Available | Stable)
    }

    /// The volume has been deleted by the user, successfully or not.
    pub fn is_deleting_family(&self) -> bool {
        matches!(self, Deleting | Deleted | Dead)
    }

    /// The status the volume moves to next, or `self` if none of the
    /// conditions of the current status holds.
    pub fn next<V>(&self, view: &V, config: &Config, now_ms: u64) -> VolumeStatus
    where V: VolumeView + ?Sized {
        match self {
            ToBeCreated => {
                if !view.segments().is_empty() {
                    Creating
                } else if view.to_be_created_timed_out(config, now_ms) {
                    Deleting
                } else {
                    ToBeCreated
                }
            }
            Creating => {
                if view.all_segments_available() {
                    Available
                } else if view.creating_timed_out(config, now_ms) {
                    Deleting
                } else {
                    Creating
                }
            }
            Available => {
                if !view.all_segments_available() {
                    Unavailable
                } else if view.is_stable() {
                    Stable
                } else {
                    Available
                }
            }
            Unavailable => {
                if view.all_segments_available() {
                    Available
                } else {
                    Unavailable
                }
            }
            Deleting => {
                if view.segments().len() != view.whole_segment_count()
                    || view.some_segment_dead()
                    || view.some_segment_empty()
                {
                    Dead
                } else if view.all_segments_deleting() {
                    Deleted
                } else {
                    Deleting
                }
            }
            Deleted => {
                if view.some_segment_dead() {
                    Dead
                } else {
                    Deleted
                }
            }
            Recycling => {
                if view.all_segments_available() {
                    Available
                } else {
                    Recycling
                }
            }
            Fixing => {
                if view.all_segments_available() {
                    Available
                } else if view.fix_timed_out(config, now_ms) {
                    Unavailable
                } else {
                    Fixing
                }
            }
            Dead => Dead,
            Stable => {
                if !view.all_segments_available() {
                    Unavailable
                } else if !view.is_stable() {
                    Available
                } else {
                    Stable
                }
            }
        }
    }
}

impl fmt::Display for VolumeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl FromStr for VolumeStatus {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|x| x.to_string() == s)
            .ok_or_else(|| UnknownName::new("volume status", s))
    }
}
