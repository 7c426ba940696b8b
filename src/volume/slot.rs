use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use log::info;

use crate::volume::VolumeExtendStatus;
use crate::volume::VolumeInAction;
use crate::volume::VolumeMetadata;
use crate::volume::VolumeStatus;
use crate::Config;

/// A value before and after a recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Change<T> {
    pub old: T,
    pub new: T,
}

impl<T: PartialEq> Change<T> {
    pub fn is_changed(&self) -> bool {
        self.old != self.new
    }
}

impl<T: fmt::Display> fmt::Display for Change<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.old, self.new)
    }
}

/// What one [`VolumeSlot::recompute`] did to each of the state machines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecomputeOutcome {
    pub status: Change<VolumeStatus>,
    pub extend_status: Change<VolumeExtendStatus>,
    pub in_action: Change<VolumeInAction>,
}

impl RecomputeOutcome {
    pub fn is_changed(&self) -> bool {
        self.status.is_changed()
            || self.extend_status.is_changed()
            || self.in_action.is_changed()
    }
}

impl fmt::Display for RecomputeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "status: {}, extend_status: {}, in_action: {}",
            self.status, self.extend_status, self.in_action
        )
    }
}

/// Holds the current snapshot of one volume.
///
/// Readers take a cheap `Arc` of the snapshot. Writers build a new snapshot
/// and swap it in; at most one update or recompute of a volume runs at a
/// time.
#[derive(Debug)]
pub struct VolumeSlot {
    current: Mutex<Arc<VolumeMetadata>>,
}

impl VolumeSlot {
    pub fn new(volume: VolumeMetadata) -> Self {
        Self {
            current: Mutex::new(Arc::new(volume)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Arc<VolumeMetadata>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> Arc<VolumeMetadata> {
        self.lock().clone()
    }

    /// Apply `f` to a copy of the current snapshot and swap the copy in.
    pub fn update<F, R>(&self, f: F) -> R
    where F: FnOnce(&mut VolumeMetadata) -> R {
        let mut current = self.lock();

        let mut next = VolumeMetadata::clone(&current);
        let res = f(&mut next);
        *current = Arc::new(next);

        res
    }

    /// Run the status, extend status and in-action machines to a fixed
    /// point, in this order, and publish the result.
    pub fn recompute(&self, config: &Config, now_ms: u64) -> RecomputeOutcome {
        let mut current = self.lock();

        let mut next = VolumeMetadata::clone(&current);
        let outcome = recompute_volume(&mut next, config, now_ms);

        if outcome.is_changed() {
            next.version += 1;
            info!("volume {}({}) recomputed: {}", next.volume_id, next.name, outcome);
            *current = Arc::new(next);
        }

        outcome
    }
}

fn run_to_fixed_point<T, F>(
    volume: &mut VolumeMetadata,
    what: &str,
    get: fn(&VolumeMetadata) -> T,
    set: fn(&mut VolumeMetadata, T),
    next: F,
) -> Change<T>
where
    T: Copy + PartialEq + fmt::Display,
    F: Fn(&VolumeMetadata, T) -> T,
{
    let old = get(volume);
    let mut cur = old;

    loop {
        let n = next(volume, cur);
        if n == cur {
            break;
        }

        info!(
            "volume {}({}) {} changed: {} -> {}",
            volume.volume_id, volume.name, what, cur, n
        );
        set(volume, n);
        cur = n;
    }

    Change { old, new: cur }
}

/// Run the three volume state machines on `volume` in place.
pub(crate) fn recompute_volume(
    volume: &mut VolumeMetadata,
    config: &Config,
    now_ms: u64,
) -> RecomputeOutcome {
    let status = run_to_fixed_point(
        volume,
        "status",
        |v| v.status,
        |v, s| v.status = s,
        |v, s: VolumeStatus| s.next(v, config, now_ms),
    );

    let extend_status = run_to_fixed_point(
        volume,
        "extend status",
        |v| v.extend_status,
        |v, s| v.extend_status = s,
        |v, s: VolumeExtendStatus| s.next(v, config, now_ms),
    );

    let in_action = run_to_fixed_point(
        volume,
        "in action",
        |v| v.in_action,
        |v, a| v.in_action = a,
        |v, a: VolumeInAction| a.next(v),
    );

    RecomputeOutcome {
        status,
        extend_status,
        in_action,
    }
}
