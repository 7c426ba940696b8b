use std::fmt;

/// A user-initiated operation on a volume, checked against the action the
/// volume is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum OperationType {
    ExtendVolume,
    DeleteVolume,
    RecycleVolume,
    FixVolume,
    LaunchDriver,
    UmountDriver,
    RecycleVolumeInfo,
}

impl OperationType {
    pub const ALL: [OperationType; 7] = [
        OperationType::ExtendVolume,
        OperationType::DeleteVolume,
        OperationType::RecycleVolume,
        OperationType::FixVolume,
        OperationType::LaunchDriver,
        OperationType::UmountDriver,
        OperationType::RecycleVolumeInfo,
    ];
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
