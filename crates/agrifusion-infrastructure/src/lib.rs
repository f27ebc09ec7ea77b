pub mod config_service;
pub mod environment_file;
pub mod image_loader;
pub mod paths;

pub use crate::config_service::ConfigService;
pub use crate::environment_file::load_series;
pub use crate::image_loader::load_image;
pub use crate::paths::AgriPaths;
