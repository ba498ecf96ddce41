//! Email sending handlers

pub mod bulk;
pub mod send;
pub mod verify;
