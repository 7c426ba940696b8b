use std::fmt;

use crate::api::volume_view::VolumeView;
use crate::Config;

/// Progress of the segments added by a volume extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum VolumeExtendStatus {
    ToBeCreated,
    Creating,
    Available,
    Unavailable,
    Deleting,
}

use VolumeExtendStatus::*;

impl VolumeExtendStatus {
    pub fn value(&self) -> u8 {
        match self {
            ToBeCreated => 1,
            Creating => 2,
            Available => 3,
            Unavailable => 4,
            Deleting => 5,
        }
    }

    pub fn next<V>(&self, view: &V, config: &Config, now_ms: u64) -> VolumeExtendStatus
    where V: VolumeView + ?Sized {
        match self {
            ToBeCreated => {
                if !view.extend_segments().is_empty() {
                    Creating
                } else if view.extend_timed_out(config, now_ms) {
                    Deleting
                } else {
                    ToBeCreated
                }
            }
            Creating => {
                if view.all_extend_segments_available() {
                    Available
                } else if view.extend_timed_out(config, now_ms) {
                    Deleting
                } else {
                    Creating
                }
            }
            Available => {
                if !view.all_extend_segments_available() {
                    Unavailable
                } else {
                    Available
                }
            }
            Unavailable => {
                if view.all_extend_segments_available() {
                    Available
                } else if view.extend_timed_out(config, now_ms) {
                    Deleting
                } else {
                    Unavailable
                }
            }
            Deleting => Deleting,
        }
    }
}

impl fmt::Display for VolumeExtendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
