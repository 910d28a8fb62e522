// Disk geometry for a FAT12 image
// Every derived layout value comes from here so the regions always agree

use bootimg_core::ImageError;
use static_assertions::const_assert;
use crate::fat_common::constants::{BOOT_SECTOR_SIZE, DIR_ENTRY_SIZE, FAT12_MAX_CLUSTERS, FIRST_DATA_CLUSTER};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fat12Geometry {
    pub bytes_per_sector: u16,
    pub total_sectors: u16,
    pub sectors_per_cluster: u8,
    pub reserved_sectors: u16,
    pub num_fats: u8,
    pub root_entries: u16,
    pub sectors_per_fat: u16,
}

/// 3.5" 1.44MB floppy layout
pub const FLOPPY_1440: Fat12Geometry = Fat12Geometry {
    bytes_per_sector: 512,
    total_sectors: 2880,
    sectors_per_cluster: 1,
    reserved_sectors: 1,
    num_fats: 2,
    root_entries: 224,
    sectors_per_fat: 9,
};

const_assert!(FLOPPY_1440.bytes_per_sector as usize == BOOT_SECTOR_SIZE);
const_assert!((FLOPPY_1440.root_entries as usize * DIR_ENTRY_SIZE) % FLOPPY_1440.bytes_per_sector as usize == 0);
const_assert!(FLOPPY_1440.data_clusters() <= FAT12_MAX_CLUSTERS);
const_assert!(FLOPPY_1440.max_cluster() < FLOPPY_1440.fat_entry_capacity());

impl Default for Fat12Geometry {
    fn default() -> Self {
        FLOPPY_1440
    }
}

impl Fat12Geometry {
    pub const fn root_dir_sectors(&self) -> u32 {
        let bps = self.bytes_per_sector as u32;
        (self.root_entries as u32 * DIR_ENTRY_SIZE as u32 + bps - 1) / bps
    }
    
    pub const fn fat_start_sector(&self) -> u32 {
        self.reserved_sectors as u32
    }
    
    pub const fn root_dir_start_sector(&self) -> u32 {
        self.fat_start_sector() + self.num_fats as u32 * self.sectors_per_fat as u32
    }
    
    pub const fn data_start_sector(&self) -> u32 {
        self.root_dir_start_sector() + self.root_dir_sectors()
    }
    
    pub const fn cluster_size(&self) -> u32 {
        self.sectors_per_cluster as u32 * self.bytes_per_sector as u32
    }
    
    pub const fn fat_size_bytes(&self) -> usize {
        self.sectors_per_fat as usize * self.bytes_per_sector as usize
    }
    
    pub const fn root_dir_size_bytes(&self) -> usize {
        self.root_dir_sectors() as usize * self.bytes_per_sector as usize
    }
    
    pub const fn image_size(&self) -> usize {
        self.total_sectors as usize * self.bytes_per_sector as usize
    }
    
    /// Clusters available in the data region
    pub const fn data_clusters(&self) -> u32 {
        (self.total_sectors as u32).saturating_sub(self.data_start_sector()) / self.sectors_per_cluster as u32
    }
    
    /// Highest cluster index that maps into the data region
    pub const fn max_cluster(&self) -> u32 {
        self.data_clusters() + FIRST_DATA_CLUSTER - 1
    }
    
    /// Number of 12-bit entries one FAT copy can hold
    pub const fn fat_entry_capacity(&self) -> u32 {
        self.fat_size_bytes() as u32 * 2 / 3
    }
    
    pub const fn fat_offset(&self, copy: u8) -> usize {
        (self.fat_start_sector() as usize + copy as usize * self.sectors_per_fat as usize)
            * self.bytes_per_sector as usize
    }
    
    pub const fn root_dir_offset(&self) -> usize {
        self.root_dir_start_sector() as usize * self.bytes_per_sector as usize
    }
    
    pub const fn data_start_offset(&self) -> u64 {
        self.data_start_sector() as u64 * self.bytes_per_sector as u64
    }
    
    /// Byte offset of a data cluster inside the image
    pub fn cluster_offset(&self, cluster: u32) -> u64 {
        self.data_start_offset() + (cluster - FIRST_DATA_CLUSTER) as u64 * self.cluster_size() as u64
    }
    
    /// Check that the layout is self-consistent and every data cluster has a FAT entry
    pub fn validate(&self) -> Result<(), ImageError> {
        if self.bytes_per_sector == 0
            || self.sectors_per_cluster == 0
            || self.num_fats == 0
            || self.root_entries == 0
            || self.sectors_per_fat == 0
        {
            return Err(ImageError::InvalidGeometry(format!("zero-sized field in {:?}", self)));
        }
        if (self.bytes_per_sector as usize) < BOOT_SECTOR_SIZE {
            return Err(ImageError::InvalidGeometry(format!(
                "{} bytes per sector cannot hold a boot sector", self.bytes_per_sector
            )));
        }
        if self.data_start_sector() >= self.total_sectors as u32 {
            return Err(ImageError::InvalidGeometry(format!(
                "metadata regions ({} sectors) leave no data region in {} sectors",
                self.data_start_sector(), self.total_sectors
            )));
        }
        if self.data_clusters() > FAT12_MAX_CLUSTERS {
            return Err(ImageError::InvalidGeometry(format!(
                "{} data clusters exceed the FAT12 limit of {}", self.data_clusters(), FAT12_MAX_CLUSTERS
            )));
        }
        if self.max_cluster() >= self.fat_entry_capacity() {
            return Err(ImageError::InvalidGeometry(format!(
                "cluster {} has no entry in a {} sector FAT ({} entries)",
                self.max_cluster(), self.sectors_per_fat, self.fat_entry_capacity()
            )));
        }
        Ok(())
    }
}
