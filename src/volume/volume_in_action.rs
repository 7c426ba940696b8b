use std::fmt;

use crate::api::volume_view::VolumeView;
use crate::errors::OperationRejected;
use crate::errors::RejectKind;
use crate::volume::OperationType;
use crate::volume::VolumeStatus;

/// The long-running action a volume is in, derived from its status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum VolumeInAction {
    Creating,
    Extending,
    Deleting,
    Recycling,
    Fixing,
    Null,
}

impl VolumeInAction {
    /// The action after the volume status has been updated.
    pub fn next<V>(&self, view: &V) -> VolumeInAction
    where V: VolumeView + ?Sized {
        use VolumeInAction as A;
        use VolumeStatus as S;

        let status = view.status();

        match self {
            A::Creating => match status {
                S::Creating | S::ToBeCreated => A::Creating,
                S::Deleting => A::Deleting,
                _ => A::Null,
            },
            A::Extending => {
                if status == S::Deleting {
                    A::Deleting
                } else if view.extending_size() > 0 {
                    A::Extending
                } else {
                    A::Null
                }
            }
            A::Deleting => match status {
                S::Recycling => A::Recycling,
                S::Deleting => A::Deleting,
                _ => A::Null,
            },
            A::Recycling => match status {
                S::Recycling => A::Recycling,
                _ => A::Null,
            },
            A::Fixing => A::Null,
            A::Null => match status {
                S::Deleting => A::Deleting,
                _ => A::Null,
            },
        }
    }

    /// Check whether `operation` may start while the volume is in this
    /// action.
    pub fn check_operation(
        &self,
        operation: OperationType,
    ) -> Result<(), OperationRejected> {
        use OperationType as O;

        let rejected = match self {
            VolumeInAction::Creating => match operation {
                O::ExtendVolume | O::RecycleVolume | O::FixVolume | O::LaunchDriver => {
                    Some(RejectKind::VolumeNotAvailable)
                }
                _ => None,
            },
            VolumeInAction::Extending => match operation {
                O::DeleteVolume
                | O::ExtendVolume
                | O::RecycleVolume
                | O::FixVolume
                | O::LaunchDriver => Some(RejectKind::VolumeInExtending),
                _ => None,
            },
            VolumeInAction::Deleting => match operation {
                O::ExtendVolume | O::DeleteVolume | O::FixVolume | O::LaunchDriver => {
                    Some(RejectKind::VolumeDeleting)
                }
                _ => None,
            },
            VolumeInAction::Recycling => match operation {
                O::ExtendVolume | O::RecycleVolume | O::FixVolume | O::LaunchDriver => {
                    Some(RejectKind::VolumeCycling)
                }
                _ => None,
            },
            VolumeInAction::Fixing | VolumeInAction::Null => None,
        };

        match rejected {
            Some(kind) => Err(OperationRejected::new(operation, *self, kind)),
            None => Ok(()),
        }
    }
}

impl fmt::Display for VolumeInAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
