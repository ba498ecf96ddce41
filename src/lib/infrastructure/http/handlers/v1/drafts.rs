//! AI drafting handlers

pub mod chat;
pub mod generate;
pub mod improve;
pub mod subjects;
pub mod template;
