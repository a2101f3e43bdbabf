//! Business logic services for the Stockcast inventory platform

pub mod forecast;
pub mod inventory;

pub use forecast::ForecastService;
pub use inventory::InventoryService;
