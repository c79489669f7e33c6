pub mod attendance;
pub mod backup;
pub mod chat;
pub mod core;
pub mod students;
