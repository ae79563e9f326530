//! Swap, cancel, and member-removal operations.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{info, warn};

use super::RotaService;
use crate::error::{Result, RotaError};
use crate::model::Rotation;
use crate::period;
use crate::sync::CalendarSync;

/// Outcome of a member removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemovalSummary {
    /// Future rotations removed from the ledger.
    pub removed_rotations: usize,
    /// Calendar events that could not be deleted and were left behind.
    pub failed_event_deletes: usize,
}

impl<C: CalendarSync> RotaService<C> {
    /// Reassign one period's rotation from one user to another.
    ///
    /// A one-off override of a single period: the existing event is deleted
    /// from the outgoing assignee's calendar (failure aborts the whole
    /// swap), a replacement is created on the incoming assignee's, and only
    /// then does the ledger record change. The group cursor is never
    /// touched, so future round-robin order is unaffected.
    pub async fn swap(
        &self,
        group_id: &str,
        period_start: NaiveDate,
        from_user_id: &str,
        to_user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Rotation> {
        let lock = self.locks.get(group_id);
        let _guard = lock.lock().await;

        let period_start = period::period_anchor(period_start);
        let (group, rotation, from_user, to_user) = self.store.read(|state| {
            let rotation = state
                .rotations
                .iter()
                .find(|r| {
                    r.group_id == group_id
                        && r.period_start == period_start
                        && r.assigned_user_id == from_user_id
                })
                .cloned();
            (
                state.group(group_id).cloned(),
                rotation,
                state.user(from_user_id).cloned(),
                state.user(to_user_id).cloned(),
            )
        });

        let group = group.ok_or_else(|| RotaError::not_found("group", group_id))?;
        let rotation = rotation.ok_or_else(|| {
            RotaError::not_found("rotation", format!("{group_id}/{period_start}/{from_user_id}"))
        })?;
        let mut from_user = from_user.ok_or_else(|| RotaError::not_found("user", from_user_id))?;
        let mut to_user = to_user.ok_or_else(|| RotaError::not_found("user", to_user_id))?;

        if let Some(event_id) = rotation.calendar_event_id.as_deref() {
            let deleted = self.calendar.delete_event(&mut from_user, event_id).await;
            self.write_back_tokens(&from_user)?;
            deleted?;
        }

        let created = self
            .calendar
            .create_event(&mut to_user, &group, period_start)
            .await;
        self.write_back_tokens(&to_user)?;
        let event_id = created?;

        let swapped = self.store.mutate(|state| {
            let stored = state
                .rotation_mut(&rotation.id)
                .ok_or_else(|| RotaError::not_found("rotation", rotation.id.clone()))?;
            stored.assigned_user_id = to_user_id.to_string();
            stored.calendar_event_id = Some(event_id);
            stored.swapped_at = Some(now);
            Ok(stored.clone())
        })?;

        info!(group_id, period = %period_start, from_user_id, to_user_id, "rotation swapped");
        Ok(swapped)
    }

    /// Cancel a rotation, removing it from the ledger.
    ///
    /// The calendar event is deleted first; if that fails the record stays,
    /// keeping store and calendar consistent. The voided slot is not
    /// re-offered -- the cursor sequence is unaffected.
    pub async fn cancel_rotation(&self, rotation_id: &str) -> Result<()> {
        let rotation = self
            .store
            .read(|s| s.rotation(rotation_id).cloned())
            .ok_or_else(|| RotaError::not_found("rotation", rotation_id))?;

        let lock = self.locks.get(&rotation.group_id);
        let _guard = lock.lock().await;

        // Re-read under the lock; a concurrent operation may have won.
        let rotation = self
            .store
            .read(|s| s.rotation(rotation_id).cloned())
            .ok_or_else(|| RotaError::not_found("rotation", rotation_id))?;

        if let Some(event_id) = rotation.calendar_event_id.as_deref() {
            let mut assignee = self
                .store
                .read(|s| s.user(&rotation.assigned_user_id).cloned())
                .ok_or_else(|| RotaError::not_found("user", rotation.assigned_user_id.clone()))?;

            let deleted = self.calendar.delete_event(&mut assignee, event_id).await;
            self.write_back_tokens(&assignee)?;
            deleted?;
        }

        self.store.mutate(|state| {
            state.rotations.retain(|r| r.id != rotation_id);
            Ok(())
        })?;

        info!(rotation_id, "rotation cancelled");
        Ok(())
    }

    /// Remove a member from a group and prune their future rotations.
    ///
    /// Rotations with `period_start >= today` assigned to the user are
    /// removed; past rotations stay. Calendar-side delete failures are
    /// tolerated here: they are logged and counted, and the ledger records
    /// are removed regardless. The cursor is not adjusted -- it is
    /// interpreted modulo the live member count, so the removal shifts
    /// which remaining member is next.
    pub async fn remove_member(
        &self,
        group_id: &str,
        user_id: &str,
        today: NaiveDate,
    ) -> Result<RemovalSummary> {
        let lock = self.locks.get(group_id);
        let _guard = lock.lock().await;

        let (group, doomed, user) = self.store.read(|state| {
            let doomed: Vec<Rotation> = state
                .rotations
                .iter()
                .filter(|r| {
                    r.group_id == group_id
                        && r.assigned_user_id == user_id
                        && r.period_start >= today
                })
                .cloned()
                .collect();
            (
                state.group(group_id).cloned(),
                doomed,
                state.user(user_id).cloned(),
            )
        });
        if group.is_none() {
            return Err(RotaError::not_found("group", group_id));
        }

        let mut failed_event_deletes = 0;
        match user {
            Some(mut user) => {
                for rotation in &doomed {
                    let Some(event_id) = rotation.calendar_event_id.as_deref() else {
                        continue;
                    };
                    if let Err(err) = self.calendar.delete_event(&mut user, event_id).await {
                        warn!(
                            rotation_id = %rotation.id,
                            %err,
                            "leaving orphaned calendar event behind"
                        );
                        failed_event_deletes += 1;
                    }
                }
                self.write_back_tokens(&user)?;
            }
            None => {
                failed_event_deletes = doomed
                    .iter()
                    .filter(|r| r.calendar_event_id.is_some())
                    .count();
                if failed_event_deletes > 0 {
                    warn!(user_id, "user record missing; cannot delete calendar events");
                }
            }
        }

        let removed_rotations = doomed.len();
        self.store.mutate(|state| {
            let group = state
                .group_mut(group_id)
                .ok_or_else(|| RotaError::not_found("group", group_id))?;
            group.members.retain(|m| m.user_id != user_id);
            state.rotations.retain(|r| {
                !(r.group_id == group_id
                    && r.assigned_user_id == user_id
                    && r.period_start >= today)
            });
            Ok(())
        })?;

        info!(
            group_id,
            user_id, removed_rotations, failed_event_deletes, "member removed"
        );
        Ok(RemovalSummary {
            removed_rotations,
            failed_event_deletes,
        })
    }
}
