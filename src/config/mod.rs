//! Configuration loading for a publication run.
//!
//! This module loads the run configuration from `publication.yaml`: the date
//! stamped into published tables, the reporting window and the output
//! directory.
//!
//! # Example
//!
//! ```no_run
//! use absence_rates::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config").unwrap();
//! println!("Output directory: {}", config.config().output_dir.display());
//! ```

mod loader;
mod types;

pub use loader::{CONFIG_FILE_NAME, ConfigLoader};
pub use types::PublicationConfig;
