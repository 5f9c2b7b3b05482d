//! Configuration management
//!
//! Handles connection options, saved profiles and user settings.

pub mod connections;
pub mod settings;

pub use connections::{ConnectionOptions, ConnectionProfile, Flavor, find_connection};
pub use settings::{Settings, load_settings};
