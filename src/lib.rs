pub mod api;
pub mod chart;
pub mod coins;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod models;
pub mod telegram;

pub use error::{Error, Result};
