//! Pattern-based field detectors.
//!
//! Each detector is a pure function over the email body; none mutate
//! shared state, so the corrector and the name resolver can call them
//! freely and in parallel.

pub mod consolidated;
pub mod patterns;
pub mod quantities;

pub use consolidated::{
    consolidated_destination_order, extract_consolidated_weight, is_consolidated_inquiry,
};
pub use quantities::{
    extract_grouped_weight, extract_plain_weight, extract_rt_value, round_quantity,
};
