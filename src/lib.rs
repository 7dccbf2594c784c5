//! Extraction, cleaning and charts for the French registry of associations
//! (RNA).
//!
//! Three independent procedures, each exposed as a `run` function returning
//! a report and wrapped by a binary:
//!
//! * [`discovery::run`] – scan the working directory and preview a CSV
//! * [`etl::run`] – filter one postal code, clean, write CSV and statistics
//! * [`viz::run`] – render PNG charts from the cleaned CSV

pub mod color;
pub mod config;
pub mod console;
pub mod data;
pub mod discovery;
pub mod error;
pub mod etl;
pub mod viz;

pub use config::Settings;
pub use error::RnaError;
