//! Domain models for the Stock Management Platform

mod forecast;
mod movement;
mod product;

pub use forecast::*;
pub use movement::*;
pub use product::*;
