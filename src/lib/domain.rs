//! Core domain modules

pub mod campaigns;
pub mod comms;
pub mod drafting;
pub mod journal;
