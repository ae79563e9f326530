//! # Visitrota Core Library
//!
//! This library provides the core business logic for Visitrota, a
//! rotating-visit scheduler. It assigns recurring visits round-robin across
//! the members of a group, one assignment per weekly period, and mirrors
//! every assignment as an event on the assignee's Google calendar.
//!
//! ## Architecture
//!
//! - **Selector**: pure round-robin choice of the next eligible assignee,
//!   honoring skip weeks
//! - **Sync**: the calendar collaborator trait plus the Google Calendar
//!   client with token refresh and bounded retry
//! - **Ops**: batch scheduling and the swap/cancel/member-removal
//!   mutations, serialized per group
//! - **Storage**: JSON snapshot store and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`RotaService`]: operation layer tying the store and calendar together
//! - [`select_next`]: the rotation selection algorithm
//! - [`GoogleCalendar`]: Calendar API client
//! - [`Store`]: snapshot persistence

pub mod error;
pub mod model;
pub mod ops;
pub mod period;
pub mod selector;
pub mod storage;
pub mod sync;

pub use error::RotaError;
pub use model::{Group, GroupMember, Rotation, RotationStatus, SkipWeek, User, VisitSchedule};
pub use ops::{BatchError, RemovalSummary, RotaService};
pub use selector::{select_next, Selection};
pub use storage::{data_dir, AppState, Config, Store};
pub use sync::{CalendarSync, CalendarTokens, GoogleCalendar};
