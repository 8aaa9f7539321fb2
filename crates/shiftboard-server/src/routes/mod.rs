pub mod display;
pub mod lines;
pub mod log;
