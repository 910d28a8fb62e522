pub mod error;
pub mod file;
pub mod manifest;
pub mod options;

pub use error::ImageError;
pub use file::ImageFile;
pub use manifest::{ImageManifest, ManifestEntry};
pub use options::BuildOptions;
