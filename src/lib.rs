//! Segment membership:
//! the replica-group membership and consistency core of a distributed block
//! storage system.
//!
//! ## Features
//!
//! - [`SegmentMembership`]: versioned role assignment of one segment's
//!   replica group, with pure transitions producing new snapshots
//! - Write quorum decision for the acknowledgements of a fanned-out write
//! - [`SegmentForm`]: the catalog of valid membership shapes per
//!   [`VolumeType`]
//! - [`MemberIoStatus`] overlay, mergeable between observations
//! - Volume status, extend status and in-action state machines
//! - Binary, JSON, compact text and flat wire encodings of a membership
//!
//! ## Example
//!
//! ```rust
//! use segment_membership::InstanceId;
//! use segment_membership::SegmentMembership;
//! use segment_membership::SegmentForm;
//! use segment_membership::SegmentVersion;
//! use segment_membership::VolumeType;
//!
//! let m = SegmentMembership::new(
//!     SegmentVersion::new(1, 0),
//!     InstanceId(1),
//!     [InstanceId(2), InstanceId(3)],
//! );
//!
//! // Secondary 3 went away.
//! let m2 = m.alive_secondary_become_inactive(InstanceId(3)).unwrap();
//! assert!(m2.version() > m.version());
//! assert_eq!(SegmentForm::PSI, VolumeType::Regular.segment_form(&m2).unwrap());
//!
//! // Primary and secondary 2 acknowledged: the write is durable.
//! assert!(m2.check_write_result(2, 1, 0, 0));
//!
//! // Node 3 caught up again.
//! let m3 = m2.inactive_secondary_become_joining(InstanceId(3)).unwrap();
//! let m4 = m3.joining_secondary_become_secondary(InstanceId(3)).unwrap();
//! assert_eq!(SegmentForm::PSS, VolumeType::Regular.segment_form(&m4).unwrap());
//! ```

mod config;
mod segment_form;
mod volume_type;

pub(crate) mod disp;
pub(crate) mod membership;
pub(crate) mod testing;

pub mod types;
pub use codeq;

pub mod api;
pub mod dump_writer;
pub mod errors;
pub mod volume;

pub use config::Config;
pub use membership::helper::ok_to_update_to_higher_membership;
pub use membership::io_status::MemberIoStatus;
pub use membership::observed::ObservedMembership;
pub use membership::segment_version::SegmentVersion;
pub use membership::wire::MembershipWire;
pub use membership::SegmentMembership;
pub use segment_form::SegmentForm;
pub use volume_type::VolumeType;

pub use crate::types::InstanceId;
pub use crate::types::RequestId;
pub use crate::types::SegId;

#[cfg(test)]
mod tests;
