use std::fmt;

use crate::volume::OperationType;
use crate::volume::VolumeInAction;

/// Why a volume operation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectKind {
    VolumeNotAvailable,
    VolumeInExtending,
    VolumeDeleting,
    VolumeCycling,
}

impl fmt::Display for RejectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RejectKind::VolumeNotAvailable => "volume is not available",
            RejectKind::VolumeInExtending => "volume is being extended",
            RejectKind::VolumeDeleting => "volume is being deleted",
            RejectKind::VolumeCycling => "volume is being recycled",
        };
        write!(f, "{}", s)
    }
}

/// An operation conflicts with the action the volume is currently in.
#[derive(Debug, Clone, PartialEq, Eq)]
#[derive(thiserror::Error)]
#[error("{operation} rejected while volume is {in_action}: {kind}")]
pub struct OperationRejected {
    pub operation: OperationType,
    pub in_action: VolumeInAction,
    pub kind: RejectKind,
}

impl OperationRejected {
    pub fn new(
        operation: OperationType,
        in_action: VolumeInAction,
        kind: RejectKind,
    ) -> Self {
        Self {
            operation,
            in_action,
            kind,
        }
    }
}

/// A textual name does not denote any variant of an enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[derive(thiserror::Error)]
#[error("Unknown {kind} name: {name:?}")]
pub struct UnknownName {
    pub kind: &'static str,
    pub name: String,
}

impl UnknownName {
    pub fn new(kind: &'static str, name: impl ToString) -> Self {
        Self {
            kind,
            name: name.to_string(),
        }
    }
}
