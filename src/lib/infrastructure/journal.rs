//! Journal storage implementations

pub mod file;
