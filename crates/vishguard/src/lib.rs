//! Core library for orchestrating simulated voice phishing awareness campaigns.
//!
//! The crate is split along the campaign data flow: the HR connector supplies a
//! roster and a department hierarchy ([`roster`], [`hierarchy`]), the exclusion
//! engine decides who may be contacted ([`exclusions`]), and the campaign layer
//! snapshots the surviving recipients into an immutable campaign record
//! ([`campaigns`]).

pub mod campaigns;
pub mod config;
pub mod error;
pub mod exclusions;
pub mod hierarchy;
pub mod roster;
pub mod telemetry;
