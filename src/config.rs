/// Timeouts driving the volume lifecycle state machines.
///
/// Optional parameters are `Option<T>` in this struct, and default values is
/// evaluated when a getter method is called.
///
/// All durations are configured in seconds; getters return milliseconds, the
/// unit of every timestamp the state machines compare against.
#[derive(Clone, Debug, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Config {
    /// How long a volume may stay in `ToBeCreated` before it is deleted.
    pub volume_to_be_created_timeout_sec: Option<u64>,

    /// How long a volume, or an extension of it, may stay in `Creating`.
    pub volume_creating_timeout_sec: Option<u64>,

    /// How long a volume may stay in `Fixing` before it is declared
    /// unavailable.
    pub fix_volume_timeout_sec: Option<u64>,
}

impl Config {
    /// Creates a new Config with default values for every field
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new Config with all configurable parameters
    pub fn new_full(
        volume_to_be_created_timeout_sec: Option<u64>,
        volume_creating_timeout_sec: Option<u64>,
        fix_volume_timeout_sec: Option<u64>,
    ) -> Self {
        Self {
            volume_to_be_created_timeout_sec,
            volume_creating_timeout_sec,
            fix_volume_timeout_sec,
        }
    }

    /// Returns the `ToBeCreated` timeout in milliseconds (defaults to 90
    /// seconds)
    pub fn volume_to_be_created_timeout_ms(&self) -> u64 {
        self.volume_to_be_created_timeout_sec.unwrap_or(90).saturating_mul(1000)
    }

    /// Returns the `Creating` timeout in milliseconds (defaults to 1800
    /// seconds)
    pub fn volume_creating_timeout_ms(&self) -> u64 {
        self.volume_creating_timeout_sec.unwrap_or(1800).saturating_mul(1000)
    }

    /// Returns the `Fixing` timeout in milliseconds (defaults to 600 seconds)
    pub fn fix_volume_timeout_ms(&self) -> u64 {
        self.fix_volume_timeout_sec.unwrap_or(600).saturating_mul(1000)
    }
}

#[cfg(test)]
mod tests {
    use crate::Config;

    #[test]
    fn test_defaults() {
        let c = Config::new();
        assert_eq!(90_000, c.volume_to_be_created_timeout_ms());
        assert_eq!(1_800_000, c.volume_creating_timeout_ms());
        assert_eq!(600_000, c.fix_volume_timeout_ms());
    }

    #[test]
    fn test_overrides() {
        let c = Config::new_full(Some(1), Some(2), None);
        assert_eq!(1_000, c.volume_to_be_created_timeout_ms());
        assert_eq!(2_000, c.volume_creating_timeout_ms());
        assert_eq!(600_000, c.fix_volume_timeout_ms());
    }

    #[test]
    fn test_huge_timeout_saturates() {
        let c = Config::new_full(Some(u64::MAX), Some(u64::MAX / 1000 + 1), None);
        assert_eq!(u64::MAX, c.volume_to_be_created_timeout_ms());
        assert_eq!(u64::MAX, c.volume_creating_timeout_ms());
    }
}
