//! Client for the SolisCloud inverter API.
//!
//! [`api::Client::fetch_all`] walks stations, their inverters and each inverter's live detail,
//! returning one flat [`model::AggregateResult`]. [`coordinator::Coordinator`] runs it on a
//! fixed interval and keeps the last good result, and [`sensor`] maps records onto named values.

pub mod api;
pub mod coordinator;
pub mod model;
pub mod sensor;
pub mod settings;

pub use api::Error;
