//! AI provider integrations

pub mod open_ai;
