pub mod config;
pub mod crops;
pub mod predict;
pub mod status;
pub mod utils;
