//! External capabilities consumed by the server

pub mod demand_model;

pub use demand_model::{load_estimator, LinearDemandModel};
