//! Business logic services for the Stock Forecast service

pub mod forecast;
pub mod ledger;

pub use forecast::ForecastService;
