//! Data models for emails, shipment records, and configuration.

pub mod config;
pub mod email;
pub mod shipment;

pub use config::{ExtractionSettings, LlmSettings, ShipexConfig};
pub use email::EmailMessage;
pub use shipment::{ProductLine, ShipmentCandidate, ShipmentExtraction};
