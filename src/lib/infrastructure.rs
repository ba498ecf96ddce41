//! Implementations of the application's outward-facing concerns

pub mod ai;
pub mod email;
pub mod http;
pub mod journal;
