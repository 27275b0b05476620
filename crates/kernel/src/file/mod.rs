//! Uploaded image management.
//!
//! Provides image path parsing and storage backends.

pub mod path;
pub mod storage;

pub use path::image_filename;
pub use storage::{BunnyStorage, ImageStorage, StorageError};
