//! CampusAssist records sidecar: student report cards, daily attendance, and
//! a chat bridge to a hosted text-generation API, served as JSON lines over
//! stdin/stdout.

pub mod attendance;
pub mod backup;
pub mod chat;
pub mod config;
pub mod grading;
pub mod ipc;
pub mod records;
pub mod store;
