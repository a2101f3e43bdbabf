//! Shared types and forecasting core for the Stockcast inventory platform
//!
//! This crate contains the domain models and the pure demand-forecasting and
//! reorder-policy engine shared between the backend and the browser (via WASM).

pub mod error;
pub mod forecasting;
pub mod models;
pub mod types;
pub mod validation;

pub use error::*;
pub use models::*;
pub use types::*;
pub use validation::*;
