//! Schema module - Configuration types for the fluid backdrop.

mod config;

pub use config::*;
