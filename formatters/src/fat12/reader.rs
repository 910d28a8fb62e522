// Read-only view over a finished FAT12 image
// Used to read files back out and by the verifier

use bootimg_core::ImageError;
use crate::fat_common::cluster_io::read_chain;
use crate::fat_common::constants::*;
use super::{DirEntry, Fat12Geometry, Fat12Table};

pub struct Fat12Reader<'a> {
    image: &'a [u8],
    geometry: Fat12Geometry,
    fat: Fat12Table,
}

impl<'a> Fat12Reader<'a> {
    pub fn new(image: &'a [u8]) -> Result<Self, ImageError> {
        if image.len() < BOOT_SECTOR_SIZE {
            return Err(ImageError::Verification(format!(
                "Image too small for a boot sector: {} bytes", image.len()
            )));
        }
        
        let geometry = parse_geometry(&image[..BOOT_SECTOR_SIZE])?;
        if geometry.data_start_offset() > image.len() as u64 {
            return Err(ImageError::Verification(format!(
                "Data region starts at {:#x} but image is only {} bytes",
                geometry.data_start_offset(), image.len()
            )));
        }
        
        let offset = geometry.fat_offset(0);
        let fat = Fat12Table::from_bytes(image[offset..offset + geometry.fat_size_bytes()].to_vec());
        
        Ok(Self { image, geometry, fat })
    }
    
    pub fn geometry(&self) -> &Fat12Geometry {
        &self.geometry
    }
    
    pub fn boot_sector(&self) -> &[u8] {
        &self.image[..BOOT_SECTOR_SIZE]
    }
    
    /// Primary FAT
    pub fn fat(&self) -> &Fat12Table {
        &self.fat
    }
    
    pub fn fat_copy(&self, copy: u8) -> &[u8] {
        let offset = self.geometry.fat_offset(copy);
        &self.image[offset..offset + self.geometry.fat_size_bytes()]
    }
    
    /// Directory records up to the first unused slot
    pub fn entries(&self) -> Vec<DirEntry> {
        let offset = self.geometry.root_dir_offset();
        self.image[offset..offset + self.geometry.root_dir_size_bytes()]
            .chunks_exact(DIR_ENTRY_SIZE)
            .map_while(DirEntry::from_bytes)
            .collect()
    }
    
    /// Look up a file by its display name, e.g. `KERNEL.ELF`
    pub fn find(&self, name: &str) -> Option<DirEntry> {
        let wanted = name.to_ascii_uppercase();
        self.entries().into_iter().find(|e| e.short_name() == wanted)
    }
    
    pub fn read_file(&self, entry: &DirEntry) -> Result<Vec<u8>, ImageError> {
        let clusters = self.fat.chain(entry.first_cluster as u32);
        let capacity = clusters.len() * self.geometry.cluster_size() as usize;
        if capacity < entry.size as usize {
            return Err(ImageError::Verification(format!(
                "{}: chain holds {} bytes, directory says {}",
                entry.short_name(), capacity, entry.size
            )));
        }
        
        Ok(read_chain(self.image, &self.geometry, &clusters, entry.size as usize)?)
    }
}

/// Recover the geometry recorded in a boot sector's BPB
pub fn parse_geometry(boot_sector: &[u8]) -> Result<Fat12Geometry, ImageError> {
    let u16_at = |off: usize| u16::from_le_bytes([boot_sector[off], boot_sector[off + 1]]);
    
    let geometry = Fat12Geometry {
        bytes_per_sector: u16_at(BPB_BYTES_PER_SEC),
        total_sectors: u16_at(BPB_TOT_SEC16),
        sectors_per_cluster: boot_sector[BPB_SEC_PER_CLUS],
        reserved_sectors: u16_at(BPB_RSVD_SEC_CNT),
        num_fats: boot_sector[BPB_NUM_FATS],
        root_entries: u16_at(BPB_ROOT_ENT_CNT),
        sectors_per_fat: u16_at(BPB_FAT_SZ16),
    };
    
    geometry.validate()?;
    Ok(geometry)
}
