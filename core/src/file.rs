// Input file model handed to the image builder
// Discovery (or a manifest) produces these; the builder only sees bytes

use std::fmt;
use std::path::Path;
use crate::ImageError;

/// One file destined for the root directory of the image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub ext: String,
    pub data: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, ext: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            ext: ext.into(),
            data,
        }
    }
    
    /// Load the whole file into memory
    pub fn from_path(
        name: impl Into<String>,
        ext: impl Into<String>,
        path: &Path,
    ) -> Result<Self, ImageError> {
        let data = std::fs::read(path).map_err(|source| ImageError::InvalidInputFile {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(name, ext, data))
    }
    
    pub fn len(&self) -> usize {
        self.data.len()
    }
    
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Display for ImageFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ext.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}.{}", self.name, self.ext)
        }
    }
}
