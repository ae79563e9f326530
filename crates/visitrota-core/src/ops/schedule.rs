//! Batch scheduling workflow.

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use super::RotaService;
use crate::error::{Result, RotaError};
use crate::model::{Rotation, RotationStatus};
use crate::period;
use crate::selector;
use crate::sync::CalendarSync;

/// A scheduling batch that stopped partway.
///
/// Iterations already committed stay committed -- there is no rollback
/// across periods. `applied` reports the committed prefix so callers can
/// see exactly how far the batch got before `source` stopped it.
#[derive(Debug, Error)]
#[error(
    "scheduled {} of {} period(s) before failing: {}",
    .applied.len(),
    .requested,
    .source
)]
pub struct BatchError {
    pub applied: Vec<Rotation>,
    pub requested: u32,
    #[source]
    pub source: RotaError,
}

impl<C: CalendarSync> RotaService<C> {
    /// Schedule `period_count` consecutive rotations for a group.
    ///
    /// `start_period` is normalized to its Monday anchor; iteration `i`
    /// targets `anchor + i` weeks. Each iteration selects an assignee,
    /// creates their calendar event, and commits the advanced cursor
    /// together with the new rotation. A selector validation failure
    /// (`EmptyGroup`, `AllSkipped`) aborts the batch with no mutation for
    /// the failing iteration; so does a calendar failure. Either way the
    /// committed prefix stands.
    pub async fn schedule_rotations(
        &self,
        group_id: &str,
        period_count: u32,
        start_period: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Vec<Rotation>, BatchError> {
        let lock = self.locks.get(group_id);
        let _guard = lock.lock().await;

        let anchor = period::period_anchor(start_period);
        let mut applied: Vec<Rotation> = Vec::new();

        for i in 0..period_count {
            let target = period::add_periods(anchor, i);
            match self.schedule_one(group_id, target, now).await {
                Ok(rotation) => {
                    info!(
                        group_id,
                        period = %target,
                        assignee = %rotation.assigned_user_id,
                        "rotation scheduled"
                    );
                    applied.push(rotation);
                }
                Err(source) => {
                    return Err(BatchError {
                        applied,
                        requested: period_count,
                        source,
                    })
                }
            }
        }

        Ok(applied)
    }

    /// One period: select, create the event, commit cursor + rotation
    /// together. Caller holds the group lock.
    async fn schedule_one(
        &self,
        group_id: &str,
        target: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Rotation> {
        let (group, skips, occupied) = self.store.read(|state| {
            let group = state.group(group_id).cloned();
            let skips: Vec<_> = state
                .skip_weeks
                .iter()
                .filter(|s| s.group_id == group_id && s.period_start == target)
                .cloned()
                .collect();
            let occupied = state
                .rotations
                .iter()
                .any(|r| r.group_id == group_id && r.period_start == target);
            (group, skips, occupied)
        });
        let group = group.ok_or_else(|| RotaError::not_found("group", group_id))?;

        if !group.active {
            return Err(RotaError::invalid(
                "group_id",
                format!("group '{group_id}' is archived"),
            ));
        }

        if occupied {
            return Err(RotaError::invalid(
                "period_start",
                format!("a rotation already exists for {target}"),
            ));
        }

        let selection = selector::select_next(&group, &skips, target)?;

        let mut assignee = self
            .store
            .read(|s| s.user(&selection.user_id).cloned())
            .ok_or_else(|| RotaError::not_found("user", selection.user_id.clone()))?;

        let created = self.calendar.create_event(&mut assignee, &group, target).await;
        // A token refresh belongs to this critical section even when the
        // create itself failed.
        self.write_back_tokens(&assignee)?;
        let event_id = created?;

        self.store.mutate(|state| {
            let group = state
                .group_mut(group_id)
                .ok_or_else(|| RotaError::not_found("group", group_id))?;
            group.cursor = selection.new_cursor;

            let rotation = Rotation {
                id: Uuid::new_v4().to_string(),
                group_id: group_id.to_string(),
                assigned_user_id: selection.user_id.clone(),
                period_start: target,
                calendar_event_id: Some(event_id),
                status: RotationStatus::Scheduled,
                created_at: now,
                swapped_at: None,
            };
            state.rotations.push(rotation.clone());
            Ok(rotation)
        })
    }
}
