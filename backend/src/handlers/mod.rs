//! HTTP handlers for the Stockcast API

pub mod forecast;
pub mod health;
pub mod inventory;

pub use forecast::*;
pub use health::*;
pub use inventory::*;
