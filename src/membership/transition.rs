//! Role transitions.
//!
//! Every transition returns `Option<SegmentMembership>`:
//! - `Some(m)` with a greater version: the role assignment changed;
//! - `Some(m)` equal to `self`: the target is not in the source role, nothing
//!   changed;
//! - `None`: the transition is not applicable and is rejected.
//!
//! Unless a transition says otherwise, a changed membership drops the temp
//! primary and both candidates.

use std::collections::BTreeSet;

use crate::InstanceId;
use crate::SegmentMembership;
use crate::SegmentVersion;

/// One of the four role sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoleSet {
    Secondary,
    Arbiter,
    Inactive,
    Joining,
}

impl SegmentMembership {
    fn role_set(&self, r: RoleSet) -> &BTreeSet<InstanceId> {
        match r {
            RoleSet::Secondary => &self.secondaries,
            RoleSet::Arbiter => &self.arbiters,
            RoleSet::Inactive => &self.inactive_secondaries,
            RoleSet::Joining => &self.joining_secondaries,
        }
    }

    fn role_set_mut(&mut self, r: RoleSet) -> &mut BTreeSet<InstanceId> {
        match r {
            RoleSet::Secondary => &mut self.secondaries,
            RoleSet::Arbiter => &mut self.arbiters,
            RoleSet::Inactive => &mut self.inactive_secondaries,
            RoleSet::Joining => &mut self.joining_secondaries,
        }
    }

    /// A copy at `version` without temp primary and candidates.
    fn successor(&self, version: SegmentVersion) -> Self {
        Self {
            version,
            temp_primary: None,
            secondary_candidate: None,
            primary_candidate: None,
            ..self.clone()
        }
    }

    fn next_generation(&self) -> Self {
        self.successor(self.version.increment_generation())
    }

    fn unchanged(&self) -> Option<Self> {
        Some(self.clone())
    }

    fn add_to(
        &self,
        role: RoleSet,
        ids: impl IntoIterator<Item = InstanceId>,
    ) -> Option<Self> {
        let ids = ids.into_iter().collect::<Vec<_>>();

        let held_elsewhere = ids
            .iter()
            .any(|id| self.contains(*id) && !self.role_set(role).contains(id));
        if held_elsewhere {
            return None;
        }

        let mut next = self.next_generation();
        let before = next.role_set(role).len();
        next.role_set_mut(role).extend(ids);

        if next.role_set(role).len() == before {
            return self.unchanged();
        }
        Some(next)
    }

    fn remove_from(&self, role: RoleSet, id: InstanceId) -> Option<Self> {
        if !self.role_set(role).contains(&id) {
            return self.unchanged();
        }

        let mut next = self.next_generation();
        next.role_set_mut(role).remove(&id);
        Some(next)
    }

    fn move_between(
        &self,
        from: RoleSet,
        to: RoleSet,
        id: InstanceId,
    ) -> Option<Self> {
        if !self.role_set(from).contains(&id) {
            return self.unchanged();
        }

        let mut next = self.next_generation();
        next.role_set_mut(from).remove(&id);
        next.role_set_mut(to).insert(id);
        Some(next)
    }

    /// Move `id` from one of `from` to the inactive secondaries, keeping the
    /// temp primary unless it is `id`.
    fn deactivate(&self, from: &[RoleSet], id: InstanceId) -> Option<Self> {
        let Some(role) = from.iter().find(|r| self.role_set(**r).contains(&id))
        else {
            return self.unchanged();
        };

        let mut next = self.next_generation();
        next.temp_primary = self.temp_primary.filter(|t| *t != id);
        next.role_set_mut(*role).remove(&id);
        next.inactive_secondaries.insert(id);
        Some(next)
    }

    fn swap_out_inactive(
        &self,
        inactive: InstanceId,
        to: RoleSet,
        id: InstanceId,
    ) -> Option<Self> {
        if !self.is_inactive_secondary(inactive) {
            return None;
        }
        if id != inactive && self.contains(id) {
            return None;
        }

        let mut next = self.next_generation();
        next.inactive_secondaries.remove(&inactive);
        next.role_set_mut(to).insert(id);
        Some(next)
    }

    pub fn add_secondary(&self, id: InstanceId) -> Option<Self> {
        self.add_to(RoleSet::Secondary, [id])
    }

    /// Add several secondaries at once; the generation increases by one if any
    /// of them is new.
    pub fn add_secondaries(
        &self,
        ids: impl IntoIterator<Item = InstanceId>,
    ) -> Option<Self> {
        self.add_to(RoleSet::Secondary, ids)
    }

    pub fn add_arbiter(&self, id: InstanceId) -> Option<Self> {
        self.add_to(RoleSet::Arbiter, [id])
    }

    pub fn add_arbiters(
        &self,
        ids: impl IntoIterator<Item = InstanceId>,
    ) -> Option<Self> {
        self.add_to(RoleSet::Arbiter, ids)
    }

    pub fn add_joining_secondary(&self, id: InstanceId) -> Option<Self> {
        self.add_to(RoleSet::Joining, [id])
    }

    pub fn remove_secondary(&self, id: InstanceId) -> Option<Self> {
        self.remove_from(RoleSet::Secondary, id)
    }

    pub fn remove_arbiter(&self, id: InstanceId) -> Option<Self> {
        self.remove_from(RoleSet::Arbiter, id)
    }

    pub fn remove_inactive_secondary(&self, id: InstanceId) -> Option<Self> {
        self.remove_from(RoleSet::Inactive, id)
    }

    /// Replace secondary `old` with `new`, keeping the size.
    ///
    /// Rejected if `old` is not a secondary or `new` already holds a role.
    pub fn replace_secondary(
        &self,
        old: InstanceId,
        new: InstanceId,
    ) -> Option<Self> {
        if !self.is_secondary(old) {
            return None;
        }
        if new != old && self.contains(new) {
            return None;
        }

        let mut next = self.next_generation();
        next.secondaries.remove(&old);
        next.secondaries.insert(new);
        Some(next)
    }

    pub fn remove_inactive_secondary_and_add_arbiter(
        &self,
        inactive: InstanceId,
        arbiter: InstanceId,
    ) -> Option<Self> {
        self.swap_out_inactive(inactive, RoleSet::Arbiter, arbiter)
    }

    pub fn remove_inactive_secondary_and_add_joining_secondary(
        &self,
        inactive: InstanceId,
        joining: InstanceId,
    ) -> Option<Self> {
        self.swap_out_inactive(inactive, RoleSet::Joining, joining)
    }

    /// A secondary or a joining secondary is found unreachable.
    ///
    /// The temp primary survives this transition, unless it is the one that
    /// went away.
    pub fn alive_secondary_become_inactive(&self, id: InstanceId) -> Option<Self> {
        self.deactivate(&[RoleSet::Secondary, RoleSet::Joining], id)
    }

    /// An arbiter is found unreliable.
    ///
    /// The temp primary survives this transition.
    pub fn arbiter_become_inactive(&self, id: InstanceId) -> Option<Self> {
        self.deactivate(&[RoleSet::Arbiter], id)
    }

    pub fn joining_secondary_become_secondary(
        &self,
        id: InstanceId,
    ) -> Option<Self> {
        self.move_between(RoleSet::Joining, RoleSet::Secondary, id)
    }

    pub fn joining_secondary_become_inactive(
        &self,
        id: InstanceId,
    ) -> Option<Self> {
        self.move_between(RoleSet::Joining, RoleSet::Inactive, id)
    }

    pub fn inactive_secondary_become_joining(
        &self,
        id: InstanceId,
    ) -> Option<Self> {
        self.move_between(RoleSet::Inactive, RoleSet::Joining, id)
    }

    pub fn inactive_secondary_become_arbiter(
        &self,
        id: InstanceId,
    ) -> Option<Self> {
        self.move_between(RoleSet::Inactive, RoleSet::Arbiter, id)
    }

    /// Let secondary `id` serve as primary while the primary is suspected to
    /// be down.
    ///
    /// The generation jumps by the number of secondary-class members, so that
    /// it passes any generation the old primary may have handed out meanwhile.
    pub fn secondary_become_temp_primary(&self, id: InstanceId) -> Option<Self> {
        let inc = self.all_secondaries().len() as u64;
        self.secondary_become_temp_primary_by(inc, id)
    }

    /// Same as [`Self::secondary_become_temp_primary`] with an explicit
    /// generation increment.
    pub fn secondary_become_temp_primary_by(
        &self,
        inc_generation: u64,
        id: InstanceId,
    ) -> Option<Self> {
        if !self.is_secondary(id) {
            return None;
        }

        let mut next =
            self.successor(self.version.increment_generation_by(inc_generation));
        next.temp_primary = Some(id);
        Some(next)
    }

    /// The control plane decided `id` is going to be the next primary.
    ///
    /// The version moves strictly past whatever a temp primary assignment
    /// could have produced. The temp primary is kept only if it is `id`.
    pub fn potential_primary_selected(&self, id: InstanceId) -> Option<Self> {
        let inc = self.all_secondaries().len() as u64 + 1;

        let mut next = self.successor(self.version.increment_generation_by(inc));
        next.temp_primary = self.temp_primary.filter(|t| *t == id);
        Some(next)
    }

    /// Make `id` the primary and start a new epoch.
    ///
    /// The old primary becomes a secondary, or an inactive secondary if a temp
    /// primary was serving: in that case the old primary missed writes and
    /// must not win a later election. Rejected if `id` is neither the primary
    /// nor a secondary.
    pub fn new_primary_chosen(&self, id: InstanceId) -> Option<Self> {
        if self.is_primary(id) {
            return Some(self.successor(self.version.increment_epoch()));
        }

        if !self.is_secondary(id) {
            log::warn!(
                "new primary {} is neither primary nor secondary in {}",
                id,
                self
            );
            return None;
        }

        let mut next = self.successor(self.version.increment_epoch());
        next.secondaries.remove(&id);
        if self.temp_primary.is_some() {
            next.inactive_secondaries.insert(self.primary);
        } else {
            next.secondaries.insert(self.primary);
        }
        next.primary = id;
        Some(next)
    }

    /// Stage secondary `id` for a controlled primary handover.
    ///
    /// Rejected if `id` is not a secondary or a primary candidate exists.
    pub fn secondary_become_primary_candidate(
        &self,
        id: InstanceId,
    ) -> Option<Self> {
        if !self.is_secondary(id) || self.primary_candidate.is_some() {
            return None;
        }

        let mut next = self.next_generation();
        next.primary_candidate = Some(id);
        Some(next)
    }

    /// Complete a controlled handover: the primary candidate becomes primary
    /// and the old primary a secondary.
    pub fn primary_candidate_become_primary(&self, id: InstanceId) -> Option<Self> {
        if !self.is_secondary(id) || !self.is_primary_candidate(id) {
            return None;
        }

        let mut next = self.successor(self.version.increment_epoch());
        next.secondaries.remove(&id);
        next.secondaries.insert(self.primary);
        next.primary = id;
        Some(next)
    }

    /// Stage `id` to replace a secondary-class member, without counting it in
    /// any role set.
    ///
    /// Rejected if another candidate is staged or `id` already holds a role.
    pub fn add_secondary_candidate(&self, id: InstanceId) -> Option<Self> {
        if self.is_secondary_candidate(id) {
            return self.unchanged();
        }
        if self.secondary_candidate.is_some() || self.is_member(id) {
            return None;
        }

        let mut next = self.next_generation();
        next.secondary_candidate = Some(id);
        Some(next)
    }

    pub fn remove_secondary_candidate(&self, id: InstanceId) -> Option<Self> {
        if !self.is_secondary_candidate(id) {
            return self.unchanged();
        }
        Some(self.next_generation())
    }

    pub fn secondary_candidate_become_joining(
        &self,
        id: InstanceId,
    ) -> Option<Self> {
        if !self.is_secondary_candidate(id) {
            return self.unchanged();
        }

        let mut next = self.next_generation();
        next.joining_secondaries.insert(id);
        Some(next)
    }

    /// Promote the secondary candidate to secondary and evict `replacee` from
    /// whichever of the secondaries, inactive or joining secondaries holds
    /// it. The size is unchanged.
    pub fn secondary_candidate_become_secondary_and_remove_replacee(
        &self,
        id: InstanceId,
        replacee: InstanceId,
    ) -> Option<Self> {
        if !self.is_secondary_candidate(id) {
            return self.unchanged();
        }

        let holder = [RoleSet::Secondary, RoleSet::Inactive, RoleSet::Joining]
            .into_iter()
            .find(|r| self.role_set(*r).contains(&replacee));

        let Some(holder) = holder else {
            return self.unchanged();
        };

        let mut next = self.next_generation();
        next.role_set_mut(holder).remove(&replacee);
        next.secondaries.insert(id);
        Some(next)
    }
}
