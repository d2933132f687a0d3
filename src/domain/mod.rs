//! Core domain types and logic.

pub mod analyzer;
pub mod config;
pub mod config_validation;
pub mod error;
pub mod indicator;
pub mod levels;
pub mod ohlcv;
pub mod period;
pub mod series;
pub mod signal;
pub mod verdict;
