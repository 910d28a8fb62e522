use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Cannot read input file {path}: {source}")]
    InvalidInputFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    
    #[error("Not enough clusters for {file}: needs {needed}, {available} left")]
    CapacityExceeded {
        file: String,
        needed: u32,
        available: u32,
    },
    
    #[error("Root directory full: cannot add {file} (capacity {capacity} entries)")]
    DirectoryFull {
        file: String,
        capacity: u16,
    },
    
    #[error("No space in image for {file}: {len} bytes at offset {offset:#x}")]
    OutOfSpace {
        file: String,
        offset: u64,
        len: usize,
    },
    
    #[error("Zero-length file cannot be placed in the image: {0}")]
    ZeroLengthFile(String),
    
    #[error("Duplicate 8.3 name in root directory: {0}")]
    DuplicateName(String),
    
    #[error("Invalid 8.3 name: {0:?}")]
    InvalidName(String),
    
    #[error("Invalid FAT12 geometry: {0}")]
    InvalidGeometry(String),
    
    #[error("Boot loader too small: {len} bytes (need at least 512)")]
    BootLoaderTooSmall {
        len: usize,
    },
    
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    
    #[error("Manifest error: {0}")]
    Manifest(#[from] serde_json::Error),
    
    #[error("Image verification failed: {0}")]
    Verification(String),
}
