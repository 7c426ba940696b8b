mod volume_errors;

use std::io;

pub use volume_errors::OperationRejected;
pub use volume_errors::RejectKind;
pub use volume_errors::UnknownName;

use crate::InstanceId;
use crate::VolumeType;

/// Errors raised while validating or comparing segment memberships.
#[derive(Debug, Clone, PartialEq, Eq)]
#[derive(thiserror::Error)]
pub enum MembershipError {
    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error(transparent)]
    InvalidMembership(#[from] InvalidMembership),

    #[error(transparent)]
    NotAMember(#[from] NotAMember),
}

impl From<MembershipError> for io::Error {
    fn from(value: MembershipError) -> Self {
        io::Error::new(io::ErrorKind::InvalidData, value.to_string())
    }
}

impl From<InvalidMembership> for io::Error {
    fn from(value: InvalidMembership) -> Self {
        io::Error::new(io::ErrorKind::InvalidData, value.to_string())
    }
}

/// The role counts of a membership do not match any form in the catalog of
/// its volume type.
#[derive(Debug, Clone, PartialEq, Eq)]
#[derive(thiserror::Error)]
#[error(
    "Invalid segment shape for {volume_type}: \
    secondaries={secondaries}, joining={joining}, inactive={inactive}, arbiters={arbiters}: {reason}"
)]
pub struct ShapeError {
    pub volume_type: VolumeType,
    pub secondaries: usize,
    pub joining: usize,
    pub inactive: usize,
    pub arbiters: usize,
    pub reason: String,
}

impl ShapeError {
    pub fn new(
        volume_type: VolumeType,
        (secondaries, joining, inactive, arbiters): (usize, usize, usize, usize),
        reason: impl ToString,
    ) -> Self {
        Self {
            volume_type,
            secondaries,
            joining,
            inactive,
            arbiters,
            reason: reason.to_string(),
        }
    }
}

/// A membership that violates a structural invariant, such as one node
/// holding two roles, or two different memberships sharing a version.
#[derive(Debug, Clone, PartialEq, Eq)]
#[derive(thiserror::Error)]
#[error("Invalid membership: {reason}")]
pub struct InvalidMembership {
    pub reason: String,
}

impl InvalidMembership {
    pub fn new(reason: impl ToString) -> Self {
        Self {
            reason: reason.to_string(),
        }
    }
}

/// An operation addressed a node that is not part of the membership.
#[derive(Debug, Clone, PartialEq, Eq)]
#[derive(thiserror::Error)]
#[error("Instance {id} is not a member: {when}")]
pub struct NotAMember {
    pub id: InstanceId,
    pub when: String,
}

impl NotAMember {
    pub fn new(id: InstanceId, when: impl ToString) -> Self {
        Self {
            id,
            when: when.to_string(),
        }
    }
}
