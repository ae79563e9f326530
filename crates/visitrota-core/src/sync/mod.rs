//! Calendar synchronization: the collaborator trait plus the Google client.

pub mod google;
pub mod oauth;

pub use google::GoogleCalendar;
pub use oauth::CalendarTokens;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;
use crate::model::{Group, User};

/// External calendar collaborator.
///
/// `user` is taken mutably so an implementation that refreshes expired
/// credentials can write the fresh tokens back into the caller's copy; the
/// operation layer persists them in the same critical section as the
/// calendar call itself.
#[async_trait]
pub trait CalendarSync: Send + Sync {
    /// Create the single event backing a rotation, returning the
    /// provider-assigned event id.
    async fn create_event(
        &self,
        user: &mut User,
        group: &Group,
        period_start: NaiveDate,
    ) -> Result<String>;

    /// Delete a previously created event. Upstream "not found" is not
    /// special-cased here; callers decide how tolerant to be.
    async fn delete_event(&self, user: &mut User, event_id: &str) -> Result<()>;
}
