//! Command implementations

pub mod models;
pub mod providers;
pub mod set_model;
pub mod update;
