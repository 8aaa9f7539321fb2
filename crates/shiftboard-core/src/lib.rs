pub mod config;
pub mod display;
pub mod error;
pub mod io;
pub mod line;
pub mod log;
pub mod paths;
pub mod penalty;
pub mod store;

pub use error::{Result, ShiftboardError};
