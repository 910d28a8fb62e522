// JSON manifest listing the files to place in the image
// Used instead of directory discovery when the build wants an explicit list

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use log::debug;
use crate::{BuildOptions, ImageError, ImageFile};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub name: String,
    #[serde(default)]
    pub ext: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageManifest {
    pub files: Vec<ManifestEntry>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub serial: Option<u32>,
    /// Directory relative entry paths resolve against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl ImageManifest {
    pub fn from_json(json: &str) -> Result<Self, ImageError> {
        Ok(serde_json::from_str(json)?)
    }
    
    pub fn load(path: &Path) -> Result<Self, ImageError> {
        let json = std::fs::read_to_string(path).map_err(|source| ImageError::InvalidInputFile {
            path: path.to_path_buf(),
            source,
        })?;
        let mut manifest = Self::from_json(&json)?;
        manifest.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        debug!("Loaded manifest {} with {} entries", path.display(), manifest.files.len());
        Ok(manifest)
    }
    
    /// Read every listed file, in manifest order
    pub fn read_files(&self) -> Result<Vec<ImageFile>, ImageError> {
        self.files
            .iter()
            .map(|entry| {
                let path = if entry.path.is_absolute() {
                    entry.path.clone()
                } else {
                    self.base_dir.join(&entry.path)
                };
                ImageFile::from_path(entry.name.clone(), entry.ext.clone(), &path)
            })
            .collect()
    }
    
    /// Fold the manifest's volume settings into build options
    pub fn apply_to(&self, options: &mut BuildOptions) {
        if let Some(label) = &self.label {
            options.volume_label = label.clone();
        }
        if let Some(serial) = self.serial {
            options.volume_serial = serial;
        }
    }
}
