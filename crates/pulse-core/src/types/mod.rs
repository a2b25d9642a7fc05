//! Core data types: data kinds, selection enums, and fetch payloads.

pub mod enums;
pub mod market_data;

pub use enums::*;
pub use market_data::*;
