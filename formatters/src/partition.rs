// Partition entry patching for the boot loader sector
// Only the first entry's LBA start and size fields are touched

use std::fs::OpenOptions;
use std::io::{Seek, SeekFrom};
use std::path::Path;
use byteorder::{LittleEndian, WriteBytesExt};
use bootimg_core::ImageError;
use log::info;
use crate::fat_common::constants::{BOOT_SECTOR_SIZE, MBR_PART_SIZE, MBR_PART_START_LBA};

/// LBA start and size of the first partition entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionExtent {
    pub start_lba: u32,
    pub size_sectors: u32,
}

fn check_len(len: usize) -> Result<(), ImageError> {
    if len < BOOT_SECTOR_SIZE {
        return Err(ImageError::BootLoaderTooSmall { len });
    }
    Ok(())
}

/// Patch the first partition entry of an in-memory boot sector
pub fn patch_partition_entry(boot_sector: &mut [u8], extent: PartitionExtent) -> Result<(), ImageError> {
    check_len(boot_sector.len())?;
    
    boot_sector[MBR_PART_START_LBA..MBR_PART_START_LBA + 4]
        .copy_from_slice(&extent.start_lba.to_le_bytes());
    boot_sector[MBR_PART_SIZE..MBR_PART_SIZE + 4]
        .copy_from_slice(&extent.size_sectors.to_le_bytes());
    Ok(())
}

pub fn read_partition_entry(boot_sector: &[u8]) -> Result<PartitionExtent, ImageError> {
    check_len(boot_sector.len())?;
    
    let u32_at = |off: usize| {
        u32::from_le_bytes([boot_sector[off], boot_sector[off + 1], boot_sector[off + 2], boot_sector[off + 3]])
    };
    Ok(PartitionExtent {
        start_lba: u32_at(MBR_PART_START_LBA),
        size_sectors: u32_at(MBR_PART_SIZE),
    })
}

/// Make sure a boot loader file is big enough to carry a partition table
pub fn check_boot_loader(path: &Path) -> Result<(), ImageError> {
    let len = std::fs::metadata(path)
        .map_err(|source| ImageError::InvalidInputFile { path: path.to_path_buf(), source })?
        .len();
    check_len(usize::try_from(len).unwrap_or(usize::MAX))
}

/// Patch the partition entry of a boot loader file in place
pub fn patch_boot_loader(path: &Path, extent: PartitionExtent) -> Result<(), ImageError> {
    check_boot_loader(path)?;
    
    let mut file = OpenOptions::new().read(true).write(true).open(path)?;
    file.seek(SeekFrom::Start(MBR_PART_START_LBA as u64))?;
    file.write_u32::<LittleEndian>(extent.start_lba)?;
    file.seek(SeekFrom::Start(MBR_PART_SIZE as u64))?;
    file.write_u32::<LittleEndian>(extent.size_sectors)?;
    file.sync_all()?;
    
    info!(
        "Patched {}: partition start LBA {}, size {} sectors",
        path.display(), extent.start_lba, extent.size_sectors
    );
    Ok(())
}
