//! Rotation operations: roster management, batch scheduling, and the
//! swap/cancel/member-removal mutations.
//!
//! Every group-scoped operation serializes on a per-group async mutex. The
//! critical section spans selector work, calendar calls, and the store
//! commit, so two calls against the same group can never interleave cursor
//! updates or rotation writes. Operations on different groups run in
//! parallel.

mod mutations;
mod schedule;

pub use mutations::RemovalSummary;
pub use schedule::BatchError;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::{Result, RotaError};
use crate::model::{Group, GroupMember, Rotation, RotationStatus, SkipWeek, User, VisitSchedule};
use crate::period;
use crate::storage::Store;
use crate::sync::{CalendarSync, CalendarTokens};

/// Lazily-populated map of per-group locks.
#[derive(Default)]
pub(crate) struct GroupLocks {
    inner: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl GroupLocks {
    pub(crate) fn get(&self, group_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut map = self.inner.lock().unwrap();
        map.entry(group_id.to_string()).or_default().clone()
    }
}

/// Operation layer tying the snapshot store and the calendar collaborator
/// together.
pub struct RotaService<C> {
    pub(crate) store: Store,
    pub(crate) calendar: C,
    pub(crate) locks: GroupLocks,
}

impl<C: CalendarSync> RotaService<C> {
    pub fn new(store: Store, calendar: C) -> Self {
        Self {
            store,
            calendar,
            locks: GroupLocks::default(),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn calendar(&self) -> &C {
        &self.calendar
    }

    // --- roster ----------------------------------------------------------

    /// Register a user. Emails must be unique.
    pub fn create_user(&self, email: &str, name: &str, now: DateTime<Utc>) -> Result<User> {
        self.store.mutate(|state| {
            if state.users.iter().any(|u| u.email == email) {
                return Err(RotaError::invalid(
                    "email",
                    format!("user with email '{email}' already exists"),
                ));
            }

            let user = User {
                id: Uuid::new_v4().to_string(),
                email: email.to_string(),
                name: name.to_string(),
                calendar_tokens: None,
                created_at: now,
            };
            state.users.push(user.clone());
            Ok(user)
        })
    }

    /// Install or replace a user's calendar credentials.
    pub fn set_calendar_tokens(&self, user_id: &str, tokens: CalendarTokens) -> Result<()> {
        self.store.mutate(|state| {
            let user = state
                .user_mut(user_id)
                .ok_or_else(|| RotaError::not_found("user", user_id))?;
            user.calendar_tokens = Some(tokens);
            Ok(())
        })
    }

    /// Create a rotation group with an empty roster and cursor 0.
    pub fn create_group(
        &self,
        name: &str,
        description: Option<String>,
        schedule: VisitSchedule,
        now: DateTime<Utc>,
    ) -> Result<Group> {
        period::validate_schedule(&schedule)?;

        self.store.mutate(|state| {
            let group = Group {
                id: Uuid::new_v4().to_string(),
                name: name.to_string(),
                description,
                members: Vec::new(),
                schedule,
                cursor: 0,
                active: true,
                created_at: now,
            };
            state.groups.push(group.clone());
            Ok(group)
        })
    }

    /// Add a member at a rotation position.
    ///
    /// Positions define the rotation order and must stay unique within the
    /// group, so collisions are rejected here rather than left to the
    /// selector.
    pub fn add_member(&self, group_id: &str, user_id: &str, order_position: u32) -> Result<()> {
        self.store.mutate(|state| {
            if state.user(user_id).is_none() {
                return Err(RotaError::not_found("user", user_id));
            }
            let group = state
                .group_mut(group_id)
                .ok_or_else(|| RotaError::not_found("group", group_id))?;

            if group.members.iter().any(|m| m.user_id == user_id) {
                return Err(RotaError::invalid(
                    "user_id",
                    format!("user '{user_id}' is already a member"),
                ));
            }
            if group.members.iter().any(|m| m.order_position == order_position) {
                return Err(RotaError::invalid(
                    "order_position",
                    format!("position {order_position} is already taken"),
                ));
            }

            group.members.push(GroupMember {
                user_id: user_id.to_string(),
                order_position,
            });
            Ok(())
        })
    }

    /// Record a skip week. The period is normalized to its Monday anchor and
    /// the (user, group, period) key must be new.
    pub fn record_skip_week(
        &self,
        group_id: &str,
        user_id: &str,
        period_start: NaiveDate,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<SkipWeek> {
        let period_start = period::period_anchor(period_start);

        self.store.mutate(|state| {
            if state.group(group_id).is_none() {
                return Err(RotaError::not_found("group", group_id));
            }
            if state.user(user_id).is_none() {
                return Err(RotaError::not_found("user", user_id));
            }
            if state.skip_weeks.iter().any(|s| {
                s.user_id == user_id && s.group_id == group_id && s.period_start == period_start
            }) {
                return Err(RotaError::DuplicateSkip {
                    user_id: user_id.to_string(),
                    group_id: group_id.to_string(),
                    period_start,
                });
            }

            let skip = SkipWeek {
                user_id: user_id.to_string(),
                group_id: group_id.to_string(),
                period_start,
                reason,
                created_at: now,
            };
            state.skip_weeks.push(skip.clone());
            Ok(skip)
        })
    }

    /// Activate or archive a group. Archived groups keep their ledger but
    /// are no longer schedulable.
    pub fn set_group_active(&self, group_id: &str, active: bool) -> Result<()> {
        self.store.mutate(|state| {
            let group = state
                .group_mut(group_id)
                .ok_or_else(|| RotaError::not_found("group", group_id))?;
            group.active = active;
            Ok(())
        })
    }

    /// Mark a rotation's visit as completed.
    pub fn mark_completed(&self, rotation_id: &str) -> Result<Rotation> {
        self.store.mutate(|state| {
            let rotation = state
                .rotation_mut(rotation_id)
                .ok_or_else(|| RotaError::not_found("rotation", rotation_id))?;
            rotation.status = RotationStatus::Completed;
            Ok(rotation.clone())
        })
    }

    // --- queries ---------------------------------------------------------

    pub fn users(&self) -> Vec<User> {
        self.store.read(|s| s.users.clone())
    }

    pub fn groups(&self) -> Vec<Group> {
        self.store.read(|s| s.groups.clone())
    }

    pub fn rotations(&self, group_id: &str) -> Vec<Rotation> {
        let mut rotations: Vec<Rotation> = self.store.read(|s| {
            s.rotations
                .iter()
                .filter(|r| r.group_id == group_id)
                .cloned()
                .collect()
        });
        rotations.sort_by_key(|r| r.period_start);
        rotations
    }

    pub fn skip_weeks(&self, group_id: &str) -> Vec<SkipWeek> {
        self.store.read(|s| {
            s.skip_weeks
                .iter()
                .filter(|sw| sw.group_id == group_id)
                .cloned()
                .collect()
        })
    }

    // --- shared internals ------------------------------------------------

    /// Persist a user's (possibly refreshed) credentials if they changed.
    ///
    /// Called right after every calendar call so a token refresh lands in
    /// the store within the same critical section, even when the calendar
    /// call itself failed.
    pub(crate) fn write_back_tokens(&self, user: &User) -> Result<()> {
        let changed = self.store.read(|s| {
            s.user(&user.id)
                .map(|stored| stored.calendar_tokens != user.calendar_tokens)
                .unwrap_or(false)
        });
        if !changed {
            return Ok(());
        }

        self.store.mutate(|state| {
            if let Some(stored) = state.user_mut(&user.id) {
                stored.calendar_tokens = user.calendar_tokens.clone();
            }
            Ok(())
        })
    }
}
