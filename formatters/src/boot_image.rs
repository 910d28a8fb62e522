// Boot image formatter
// Builds the FAT12 image, persists it, then records the partition in the boot loader

use std::path::{Path, PathBuf};
use bootimg_core::{BuildOptions, ImageError, ImageFile};
use log::{info, warn};
use crate::fat12::{Fat12Image, Fat12ImageBuilder, Fat12Verifier, PlacedFile};
use crate::partition::{check_boot_loader, patch_boot_loader, PartitionExtent};

/// Outcome of a build, for reporting
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub image_path: Option<PathBuf>,
    pub total_sectors: u32,
    pub partition: PartitionExtent,
    pub files: Vec<PlacedFile>,
    pub clusters_used: u32,
    pub clusters_free: u32,
}

impl BuildReport {
    fn new(image: &Fat12Image, partition: PartitionExtent, image_path: Option<PathBuf>) -> Self {
        Self {
            image_path,
            total_sectors: image.total_sectors(),
            partition,
            files: image.files().to_vec(),
            clusters_used: image.clusters_used(),
            clusters_free: image.clusters_free(),
        }
    }
}

pub struct BootImageFormatter {
    options: BuildOptions,
}

impl BootImageFormatter {
    pub fn new(options: BuildOptions) -> Self {
        Self { options }
    }
    
    pub fn options(&self) -> &BuildOptions {
        &self.options
    }
    
    fn build_image(&self, files: &[ImageFile]) -> Result<Fat12Image, ImageError> {
        let image = Fat12ImageBuilder::build(files, &self.options)?;
        
        if self.options.verify_after_build {
            let result = Fat12Verifier::verify_image(image.as_bytes())?.into_result()?;
            for warning in &result.warnings {
                warn!("{}", warning);
            }
        }
        Ok(image)
    }
    
    fn partition_for(&self, image: &Fat12Image) -> PartitionExtent {
        PartitionExtent {
            start_lba: self.options.partition_start,
            size_sectors: image.total_sectors(),
        }
    }
    
    /// Build the image in memory without writing anything
    pub fn dry_run(&self, files: &[ImageFile]) -> Result<BuildReport, ImageError> {
        let image = self.build_image(files)?;
        Ok(BuildReport::new(&image, self.partition_for(&image), None))
    }
    
    /// Build `files` into `image_path` and patch the partition entry of `boot_loader`.
    /// Any failure before the image is persisted leaves `image_path` untouched.
    pub fn format(
        &self,
        boot_loader: &Path,
        image_path: &Path,
        files: &[ImageFile],
    ) -> Result<BuildReport, ImageError> {
        info!("Building {} from {} files", image_path.display(), files.len());
        
        check_boot_loader(boot_loader)?;
        let image = self.build_image(files)?;
        image.write_to(image_path)?;
        
        let partition = self.partition_for(&image);
        patch_boot_loader(boot_loader, partition)?;
        
        Ok(BuildReport::new(&image, partition, Some(image_path.to_path_buf())))
    }
}

impl Default for BootImageFormatter {
    fn default() -> Self {
        Self::new(BuildOptions::default())
    }
}
