//! Volume lifecycle: segment availability aggregated into the volume status,
//! extend status and in-action state machines.

mod metadata;
mod operation;
mod segment;
mod slot;
mod volume_extend_status;
mod volume_in_action;
mod volume_status;

pub use metadata::VolumeMetadata;
pub use operation::OperationType;
pub use segment::SegmentMetadata;
pub use segment::SegmentStatus;
pub use segment::SegmentUnitReport;
pub use segment::SegmentUnitStatus;
pub use slot::Change;
pub use slot::RecomputeOutcome;
pub use slot::VolumeSlot;
pub use volume_extend_status::VolumeExtendStatus;
pub use volume_in_action::VolumeInAction;
pub use volume_status::VolumeStatus;
