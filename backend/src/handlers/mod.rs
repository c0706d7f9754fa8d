//! HTTP handlers for the Stock Forecast service

pub mod forecast;
pub mod health;

pub use forecast::*;
pub use health::*;
