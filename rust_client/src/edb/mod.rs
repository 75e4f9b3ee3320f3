//! Access to the JWST engineering database hosted by MAST at STScI.

pub mod client;
pub mod timeseries;

pub use client::EngineeringDatabase;
pub use timeseries::{CadenceStats, EdbTimeSeries, EdbValue, Gap, Sample, SqlType};
