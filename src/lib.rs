pub mod config;
pub mod history;
pub mod process;
pub mod transform;
