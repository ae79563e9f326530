pub mod group;
pub mod rotation;
pub mod schedule;
pub mod skip;
pub mod user;
