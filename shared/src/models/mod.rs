//! Domain models for the Stockcast inventory platform

mod forecast;
mod inventory;
mod sales;

pub use forecast::*;
pub use inventory::*;
pub use sales::*;
