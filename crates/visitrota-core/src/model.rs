//! Domain types for users, groups, skip weeks, and rotations.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::sync::CalendarTokens;

/// A person who can be assigned visits.
///
/// Users are created through the request surface and never deleted;
/// `calendar_tokens` is installed once the identity collaborator has run the
/// OAuth exchange, and refreshed in place when expired.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub calendar_tokens: Option<CalendarTokens>,
    pub created_at: DateTime<Utc>,
}

/// Membership of one user in a group's rotation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupMember {
    pub user_id: String,
    /// Position in the rotation. Values define a total order; callers must
    /// keep them unique within a group.
    pub order_position: u32,
}

/// The group's recurring visit slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitSchedule {
    /// 0 = Monday .. 6 = Sunday, as an offset from the period anchor.
    pub day_of_week: u8,
    /// HH:MM
    pub time_of_day: String,
}

/// A rotation unit: an ordered roster plus a round-robin cursor.
///
/// `cursor` is interpreted modulo the current member count, never tied to a
/// member identity. Removing a member therefore reinterprets what the cursor
/// points at on the next selection; that is a retained design property of
/// the rotation scheme, not an accident.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub members: Vec<GroupMember>,
    pub schedule: VisitSchedule,
    pub cursor: usize,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Group {
    /// Members sorted by `order_position`, the order the selector scans in.
    pub fn sorted_members(&self) -> Vec<&GroupMember> {
        let mut members: Vec<&GroupMember> = self.members.iter().collect();
        members.sort_by_key(|m| m.order_position);
        members
    }
}

/// A declared exception removing one user's eligibility for one period.
///
/// The key (user_id, group_id, period_start) is unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkipWeek {
    pub user_id: String,
    pub group_id: String,
    pub period_start: NaiveDate,
    #[serde(default)]
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Lifecycle state of a rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationStatus {
    Scheduled,
    Completed,
    Cancelled,
}

/// One concrete assignment of a user to a group for a specific period.
///
/// `period_start` is always the canonical Monday of the period, independent
/// of the weekday the visit actually happens on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rotation {
    pub id: String,
    pub group_id: String,
    pub assigned_user_id: String,
    pub period_start: NaiveDate,
    #[serde(default)]
    pub calendar_event_id: Option<String>,
    pub status: RotationStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub swapped_at: Option<DateTime<Utc>>,
}
