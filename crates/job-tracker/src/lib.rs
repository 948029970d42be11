//! Personal job-application tracker: an in-memory store of applications, emails, and a
//! profile behind a JSON API, with optional Google Sheets and Gmail sync.

pub mod config;
pub mod error;
pub mod sync;
pub mod telemetry;
pub mod tracker;
