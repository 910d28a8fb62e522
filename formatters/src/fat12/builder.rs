// FAT12 image builder
// Boot sector, FAT chains, root directory and file data all land in one
// in-memory buffer; nothing touches disk until the finished image is written

use std::io::Write;
use std::path::Path;
use bootimg_core::{BuildOptions, ImageError, ImageFile};
use log::{debug, info};
use tempfile::NamedTempFile;
use crate::fat_common::boot_sector::{build_fat12_boot_sector, Fat12BootSectorParams};
use crate::fat_common::cluster_io::{copy_run, run_range};
use crate::fat_common::constants::BOOT_SECTOR_SIZE;
use super::{ClusterAllocator, ClusterRun, DirEntry, Fat12Geometry, Fat12Table, RootDirectory, FLOPPY_1440};

/// Where a file ended up inside the image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedFile {
    pub name: String,
    pub run: ClusterRun,
    pub size: u32,
    pub data_offset: u64,
}

pub struct Fat12ImageBuilder {
    geometry: Fat12Geometry,
    image: Vec<u8>,
    fat: Fat12Table,
    root_dir: RootDirectory,
    allocator: ClusterAllocator,
    placed: Vec<PlacedFile>,
}

impl Fat12ImageBuilder {
    pub fn new(options: &BuildOptions) -> Self {
        Self::from_valid_geometry(FLOPPY_1440, options)
    }
    
    /// Builder for a custom layout; the geometry must leave room for a data region
    /// and a FAT entry for every data cluster
    pub fn with_geometry(geometry: Fat12Geometry, options: &BuildOptions) -> Result<Self, ImageError> {
        geometry.validate()?;
        Ok(Self::from_valid_geometry(geometry, options))
    }
    
    fn from_valid_geometry(geometry: Fat12Geometry, options: &BuildOptions) -> Self {
        let mut image = vec![0u8; geometry.image_size()];
        
        let params = Fat12BootSectorParams::from_options(options);
        let boot_sector = build_fat12_boot_sector(&params, &geometry);
        image[..BOOT_SECTOR_SIZE].copy_from_slice(&boot_sector);
        
        Self {
            geometry,
            image,
            fat: Fat12Table::new(&geometry, params.media_descriptor),
            root_dir: RootDirectory::new(&geometry),
            allocator: ClusterAllocator::new(&geometry),
            placed: Vec::new(),
        }
    }
    
    /// Build a complete image from `files` in order
    pub fn build(files: &[ImageFile], options: &BuildOptions) -> Result<Fat12Image, ImageError> {
        let mut builder = Self::new(options);
        builder.add_files(files)?;
        Ok(builder.finish())
    }
    
    pub fn add_files(&mut self, files: &[ImageFile]) -> Result<(), ImageError> {
        for file in files {
            self.add_file(file)?;
        }
        Ok(())
    }
    
    /// Allocate clusters for one file, copy its bytes and add its directory record
    pub fn add_file(&mut self, file: &ImageFile) -> Result<PlacedFile, ImageError> {
        let display = file.to_string();
        
        // Directory slot and name are checked before any cluster is taken
        let mut entry = DirEntry::new(&file.name, &file.ext, 0, 0)?;
        self.root_dir.check_insert(&entry)?;
        
        let run = self.allocator.allocate(&display, file.len() as u64)?;
        
        let data_offset = self.geometry.cluster_offset(run.start);
        if run_range(&self.geometry, &run).end > self.image.len() {
            return Err(ImageError::OutOfSpace {
                file: display,
                offset: data_offset,
                len: file.len(),
            });
        }
        
        copy_run(&mut self.image, &self.geometry, &run, &file.data)?;
        run.link_into(&mut self.fat);
        
        entry.first_cluster = run.start as u16;
        entry.size = file.len() as u32;
        let name = entry.short_name();
        self.root_dir.push(entry)?;
        
        debug!(
            "Placed {} as {}: {} bytes at {:#x}, clusters {}..={}",
            display, name, file.len(), data_offset, run.start, run.last()
        );
        
        let placed = PlacedFile {
            name,
            run,
            size: file.len() as u32,
            data_offset,
        };
        self.placed.push(placed.clone());
        Ok(placed)
    }
    
    pub fn geometry(&self) -> &Fat12Geometry {
        &self.geometry
    }
    
    pub fn fat(&self) -> &Fat12Table {
        &self.fat
    }
    
    pub fn root_directory(&self) -> &RootDirectory {
        &self.root_dir
    }
    
    /// Copy the FAT (once per copy) and the root directory into the image
    pub fn finish(mut self) -> Fat12Image {
        let fat_bytes = self.fat.as_bytes();
        for copy in 0..self.geometry.num_fats {
            let offset = self.geometry.fat_offset(copy);
            self.image[offset..offset + fat_bytes.len()].copy_from_slice(fat_bytes);
        }
        
        let root_offset = self.geometry.root_dir_offset();
        let root_bytes = self.root_dir.as_bytes();
        self.image[root_offset..root_offset + root_bytes.len()].copy_from_slice(root_bytes);
        
        info!(
            "Built FAT12 image: {} files, {} clusters used, {} free",
            self.placed.len(),
            self.allocator.used(),
            self.allocator.remaining()
        );
        
        Fat12Image {
            bytes: self.image,
            geometry: self.geometry,
            files: self.placed,
            clusters_used: self.allocator.used(),
            clusters_free: self.allocator.remaining(),
        }
    }
}

/// A finished image, ready to be persisted
#[derive(Debug, Clone)]
pub struct Fat12Image {
    bytes: Vec<u8>,
    geometry: Fat12Geometry,
    files: Vec<PlacedFile>,
    clusters_used: u32,
    clusters_free: u32,
}

impl Fat12Image {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
    
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
    
    pub fn geometry(&self) -> &Fat12Geometry {
        &self.geometry
    }
    
    pub fn files(&self) -> &[PlacedFile] {
        &self.files
    }
    
    pub fn clusters_used(&self) -> u32 {
        self.clusters_used
    }
    
    pub fn clusters_free(&self) -> u32 {
        self.clusters_free
    }
    
    pub fn total_sectors(&self) -> u32 {
        (self.bytes.len() / self.geometry.bytes_per_sector as usize) as u32
    }
    
    /// Write the image through a temporary file in the same directory,
    /// then rename it over `path`
    pub fn write_to(&self, path: &Path) -> Result<(), ImageError> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&self.bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        
        info!("Wrote {} ({} bytes, {} sectors)", path.display(), self.bytes.len(), self.total_sectors());
        Ok(())
    }
}
