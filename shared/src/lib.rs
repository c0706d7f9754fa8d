//! Shared types and forecasting logic for the Stock Management Platform
//!
//! This crate contains the movement ledger models and the stock forecasting
//! pipeline shared between the backend, the frontend (via WASM), and other
//! components of the system. Nothing here performs I/O.

pub mod error;
pub mod forecast;
pub mod models;
pub mod types;
pub mod validation;

pub use error::*;
pub use forecast::*;
pub use models::*;
pub use types::*;
pub use validation::*;
