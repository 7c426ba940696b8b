use pretty_assertions::assert_eq;

use crate::api::volume_view::VolumeView;
use crate::errors::RejectKind;
use crate::tests::context::bare_segment;
use crate::tests::context::config;
use crate::tests::context::new_volume;
use crate::tests::context::reported_segment;
use crate::tests::context::slot_of;
use crate::tests::context::stable_segment;
use crate::tests::context::with_segments;
use crate::tests::context::CREATED_MS;
use crate::tests::context::WAIT_TO_CREATE_UNIT_MS;
use crate::testing::id;
use crate::testing::ids;
use crate::testing::membership;
use crate::volume::Change;
use crate::volume::OperationType;
use crate::volume::SegmentStatus;
use crate::volume::SegmentUnitReport;
use crate::volume::SegmentUnitStatus;
use crate::volume::VolumeExtendStatus;
use crate::volume::VolumeInAction;
use crate::volume::VolumeStatus;

fn change<T>(old: T, new: T) -> Change<T> {
    Change { old, new }
}

#[test]
fn test_create_to_stable_in_one_recompute() {
    let slot = slot_of(with_segments(new_volume(2), [
        stable_segment(),
        stable_segment(),
    ]));

    let outcome = slot.recompute(&config(), CREATED_MS + 1);

    assert_eq!(
        change(VolumeStatus::ToBeCreated, VolumeStatus::Stable),
        outcome.status
    );
    assert_eq!(
        change(VolumeExtendStatus::ToBeCreated, VolumeExtendStatus::ToBeCreated),
        outcome.extend_status
    );
    assert_eq!(
        change(VolumeInAction::Null, VolumeInAction::Null),
        outcome.in_action
    );

    let snap = slot.snapshot();
    assert_eq!(VolumeStatus::Stable, snap.status());
    assert_eq!(1, snap.version());

    // Nothing to do: the snapshot is not replaced.
    let outcome = slot.recompute(&config(), CREATED_MS + 2);
    assert!(!outcome.is_changed());
    assert_eq!(1, slot.snapshot().version());
}

#[test]
fn test_creating_timeout() {
    let volume = with_segments(new_volume(2), [stable_segment()])
        .with_in_action(VolumeInAction::Creating);
    let slot = slot_of(volume);

    let outcome = slot.recompute(&config(), CREATED_MS + 1);
    assert_eq!(
        change(VolumeStatus::ToBeCreated, VolumeStatus::Creating),
        outcome.status
    );
    assert_eq!(
        change(VolumeInAction::Creating, VolumeInAction::Creating),
        outcome.in_action
    );

    // Exactly at the timeout: still creating.
    let deadline = CREATED_MS + WAIT_TO_CREATE_UNIT_MS + 60_000;
    assert!(!slot.recompute(&config(), deadline).is_changed());

    // Past it the volume is deleted, and with a segment missing it is dead.
    let outcome = slot.recompute(&config(), deadline + 1);
    assert_eq!(
        change(VolumeStatus::Creating, VolumeStatus::Dead),
        outcome.status
    );
    assert_eq!(
        change(VolumeInAction::Creating, VolumeInAction::Null),
        outcome.in_action
    );
}

#[test]
fn test_to_be_created_timeout() {
    let slot = slot_of(new_volume(2));

    let deadline = CREATED_MS + WAIT_TO_CREATE_UNIT_MS + 10_000;
    assert!(!slot.recompute(&config(), deadline).is_changed());

    let outcome = slot.recompute(&config(), deadline + 1);
    assert_eq!(
        change(VolumeStatus::ToBeCreated, VolumeStatus::Dead),
        outcome.status
    );
}

#[test]
fn test_available_unavailable_stable() {
    let slot = slot_of(with_segments(new_volume(2), [
        stable_segment(),
        stable_segment(),
    ]));
    slot.recompute(&config(), CREATED_MS);
    assert_eq!(VolumeStatus::Stable, slot.snapshot().status());

    // Available but degraded: no longer stable.
    slot.update(|v| v.put_segment(1, bare_segment(SegmentStatus::Degraded)));
    let outcome = slot.recompute(&config(), CREATED_MS);
    assert_eq!(
        change(VolumeStatus::Stable, VolumeStatus::Available),
        outcome.status
    );

    slot.update(|v| v.put_segment(1, bare_segment(SegmentStatus::Unavailable)));
    let outcome = slot.recompute(&config(), CREATED_MS);
    assert_eq!(
        change(VolumeStatus::Available, VolumeStatus::Unavailable),
        outcome.status
    );

    // A segment missing from the table is as bad as an unavailable one.
    slot.update(|v| {
        v.segments.remove(&1);
    });
    assert!(!slot.recompute(&config(), CREATED_MS).is_changed());

    slot.update(|v| v.put_segment(1, stable_segment()));
    let outcome = slot.recompute(&config(), CREATED_MS);
    assert_eq!(
        change(VolumeStatus::Unavailable, VolumeStatus::Stable),
        outcome.status
    );
}

#[test]
fn test_deleting() {
    let volume = with_segments(new_volume(2), [
        reported_segment(SegmentStatus::Deleting),
        reported_segment(SegmentStatus::Healthy),
    ])
    .with_status(VolumeStatus::Deleting);
    let slot = slot_of(volume);

    // Not every segment is deleting yet.
    let outcome = slot.recompute(&config(), CREATED_MS);
    assert_eq!(
        change(VolumeStatus::Deleting, VolumeStatus::Deleting),
        outcome.status
    );
    assert_eq!(
        change(VolumeInAction::Null, VolumeInAction::Deleting),
        outcome.in_action
    );

    slot.update(|v| v.put_segment(1, reported_segment(SegmentStatus::Deleting)));
    let outcome = slot.recompute(&config(), CREATED_MS);
    assert_eq!(
        change(VolumeStatus::Deleting, VolumeStatus::Deleted),
        outcome.status
    );
    assert_eq!(
        change(VolumeInAction::Deleting, VolumeInAction::Null),
        outcome.in_action
    );
    assert!(slot.snapshot().can_be_recycled());

    slot.update(|v| v.put_segment(0, reported_segment(SegmentStatus::Dead)));
    let outcome = slot.recompute(&config(), CREATED_MS);
    assert_eq!(
        change(VolumeStatus::Deleted, VolumeStatus::Dead),
        outcome.status
    );

    // Dead is terminal.
    slot.update(|v| v.put_segment(0, stable_segment()));
    assert!(!slot.recompute(&config(), CREATED_MS).is_changed());
}

#[test]
fn test_deleting_with_empty_segment_is_dead() {
    let volume = with_segments(new_volume(2), [
        bare_segment(SegmentStatus::Deleting),
        reported_segment(SegmentStatus::Deleting),
    ])
    .with_status(VolumeStatus::Deleting);

    let outcome = slot_of(volume).recompute(&config(), CREATED_MS);
    assert_eq!(
        change(VolumeStatus::Deleting, VolumeStatus::Dead),
        outcome.status
    );
}

#[test]
fn test_fixing() {
    let mut volume = with_segments(new_volume(2), [
        stable_segment(),
        bare_segment(SegmentStatus::Unavailable),
    ])
    .with_status(VolumeStatus::Fixing)
    .with_in_action(VolumeInAction::Fixing);
    volume.mark_last_fix(CREATED_MS);
    let slot = slot_of(volume);

    let outcome = slot.recompute(&config(), CREATED_MS + 30_000);
    assert_eq!(
        change(VolumeStatus::Fixing, VolumeStatus::Fixing),
        outcome.status
    );
    assert_eq!(
        change(VolumeInAction::Fixing, VolumeInAction::Null),
        outcome.in_action
    );

    let outcome = slot.recompute(&config(), CREATED_MS + 30_001);
    assert_eq!(
        change(VolumeStatus::Fixing, VolumeStatus::Unavailable),
        outcome.status
    );

    // A fixed volume becomes available.
    let volume = with_segments(new_volume(2), [stable_segment(), stable_segment()])
        .with_status(VolumeStatus::Fixing);
    let outcome = slot_of(volume).recompute(&config(), CREATED_MS);
    assert_eq!(
        change(VolumeStatus::Fixing, VolumeStatus::Stable),
        outcome.status
    );
}

#[test]
fn test_recycling() {
    let volume = with_segments(new_volume(2), [
        stable_segment(),
        bare_segment(SegmentStatus::Deleting),
    ])
    .with_status(VolumeStatus::Recycling)
    .with_in_action(VolumeInAction::Deleting);
    let slot = slot_of(volume);

    let outcome = slot.recompute(&config(), CREATED_MS);
    assert_eq!(
        change(VolumeStatus::Recycling, VolumeStatus::Recycling),
        outcome.status
    );
    assert_eq!(
        change(VolumeInAction::Deleting, VolumeInAction::Recycling),
        outcome.in_action
    );
    assert!(slot.snapshot().is_recycling());

    let err = slot.snapshot().in_action().check_operation(OperationType::FixVolume);
    assert_eq!(RejectKind::VolumeCycling, err.unwrap_err().kind);

    slot.update(|v| v.put_segment(1, stable_segment()));
    let outcome = slot.recompute(&config(), CREATED_MS);
    assert_eq!(
        change(VolumeStatus::Recycling, VolumeStatus::Stable),
        outcome.status
    );
    assert_eq!(
        change(VolumeInAction::Recycling, VolumeInAction::Null),
        outcome.in_action
    );
}

#[test]
fn test_extend() {
    let slot = slot_of(with_segments(new_volume(2), [
        stable_segment(),
        stable_segment(),
    ]));
    slot.recompute(&config(), CREATED_MS);

    let now = 2_000_000;
    slot.update(|v| v.start_extend(2 * 100, now));

    let snap = slot.snapshot();
    assert_eq!(VolumeInAction::Extending, snap.in_action());
    assert_eq!(
        RejectKind::VolumeInExtending,
        snap.in_action()
            .check_operation(OperationType::DeleteVolume)
            .unwrap_err()
            .kind
    );

    assert!(!slot.recompute(&config(), now + 1).is_changed());

    slot.update(|v| {
        v.put_extend_segment(2, stable_segment());
        v.put_extend_segment(3, stable_segment());
    });
    let outcome = slot.recompute(&config(), now + 1);
    assert_eq!(
        change(VolumeExtendStatus::ToBeCreated, VolumeExtendStatus::Available),
        outcome.extend_status
    );
    assert_eq!(
        change(VolumeInAction::Extending, VolumeInAction::Extending),
        outcome.in_action
    );

    slot.update(|v| v.finish_extend());
    let outcome = slot.recompute(&config(), now + 2);
    assert_eq!(
        change(VolumeStatus::Stable, VolumeStatus::Stable),
        outcome.status
    );
    assert_eq!(
        change(VolumeInAction::Extending, VolumeInAction::Null),
        outcome.in_action
    );

    let snap = slot.snapshot();
    assert_eq!(400, snap.volume_size());
    assert_eq!(4, snap.segments().len());
    assert!(snap.extend_segments().is_empty());
}

#[test]
fn test_extend_timeout() {
    let slot = slot_of(with_segments(new_volume(2), [
        stable_segment(),
        stable_segment(),
    ]));

    let now = 2_000_000;
    slot.update(|v| v.start_extend(100, now));

    let outcome = slot.recompute(&config(), now + WAIT_TO_CREATE_UNIT_MS + 60_001);
    assert_eq!(
        change(VolumeExtendStatus::ToBeCreated, VolumeExtendStatus::Deleting),
        outcome.extend_status
    );

    slot.update(|v| v.abort_extend());
    let outcome = slot.recompute(&config(), now + WAIT_TO_CREATE_UNIT_MS + 60_002);
    assert_eq!(
        change(VolumeInAction::Extending, VolumeInAction::Null),
        outcome.in_action
    );
    assert_eq!(
        change(VolumeExtendStatus::Deleting, VolumeExtendStatus::Deleting),
        outcome.extend_status
    );
}

#[test]
fn test_snapshot_is_not_affected_by_updates() {
    let slot = slot_of(new_volume(1));
    let before = slot.snapshot();

    slot.update(|v| v.put_segment(0, stable_segment()));

    assert!(before.segments().is_empty());
    assert_eq!(1, slot.snapshot().segments().len());
}

#[test]
fn test_not_stable() {
    let volume = with_segments(new_volume(1), [stable_segment()])
        .with_status(VolumeStatus::Available);
    assert!(volume.is_stable());

    // Not in an available status.
    let v = volume.clone().with_status(VolumeStatus::Unavailable);
    assert!(!v.is_stable());

    // Membership with an inactive secondary.
    let m = membership((1, 1), 1, &[2]).with_inactive_secondaries(ids(&[3]));
    let mut v = volume.clone();
    v.segments.get_mut(&0).unwrap().units.insert(
        id(1),
        SegmentUnitReport::new(SegmentUnitStatus::Primary, m),
    );
    assert!(!v.is_stable());

    // The primary's unit is not serving as primary.
    let mut v = volume.clone();
    v.segments.get_mut(&0).unwrap().units.get_mut(&id(1)).unwrap().status =
        SegmentUnitStatus::PrePrimary;
    assert!(!v.is_stable());

    // Segment count does not match the volume size.
    let mut v = volume.clone();
    v.put_segment(1, stable_segment());
    assert!(!v.is_stable());
}

#[test]
fn test_refresh_segment_statuses() {
    let mut volume = with_segments(new_volume(1), [bare_segment(SegmentStatus::Healthy)]);
    volume.refresh_segment_statuses();
    assert_eq!(SegmentStatus::Unavailable, volume.segments()[&0].status);

    volume.put_segment(0, stable_segment());
    volume.refresh_segment_statuses();
    assert_eq!(SegmentStatus::Healthy, volume.segments()[&0].status);
}
