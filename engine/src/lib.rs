// Engine library root: ingestion, aggregation and the dashboard sections
// built on top of the shared record model.

pub mod aggregation;
pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod services;
pub mod views;

pub use error::EngineError;
