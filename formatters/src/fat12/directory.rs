// Root directory entries for FAT12 images
// Fixed 32-byte short-name records; no subdirectories or long names

use bootimg_core::ImageError;
use crate::fat_common::constants::*;
use super::Fat12Geometry;

pub const ATTR_ARCHIVE: u8 = 0x20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: [u8; 8],
    pub ext: [u8; 3],
    pub attributes: u8,
    pub first_cluster: u16,
    pub size: u32,
}

impl DirEntry {
    /// Archive entry with the name and extension normalised to 8.3
    pub fn new(name: &str, ext: &str, first_cluster: u16, size: u32) -> Result<Self, ImageError> {
        let name_field: [u8; 8] = short_name_field(name)?;
        if name_field[0] == b' ' {
            return Err(ImageError::InvalidName(name.to_string()));
        }
        
        Ok(Self {
            name: name_field,
            ext: short_name_field(ext)?,
            attributes: ATTR_ARCHIVE,
            first_cluster,
            size,
        })
    }
    
    pub fn to_bytes(&self) -> [u8; DIR_ENTRY_SIZE] {
        let mut raw = [0u8; DIR_ENTRY_SIZE];
        raw[DIR_NAME..DIR_NAME + 8].copy_from_slice(&self.name);
        raw[DIR_EXT..DIR_EXT + 3].copy_from_slice(&self.ext);
        raw[DIR_ATTR] = self.attributes;
        raw[DIR_FST_CLUS_LO..DIR_FST_CLUS_LO + 2].copy_from_slice(&self.first_cluster.to_le_bytes());
        raw[DIR_FILE_SIZE..DIR_FILE_SIZE + 4].copy_from_slice(&self.size.to_le_bytes());
        raw
    }
    
    /// Parse a raw record; `None` for an unused slot
    pub fn from_bytes(raw: &[u8]) -> Option<Self> {
        if raw.len() < DIR_ENTRY_SIZE || raw[DIR_NAME] == DIR_ENTRY_END {
            return None;
        }
        
        let mut name = [0u8; 8];
        let mut ext = [0u8; 3];
        name.copy_from_slice(&raw[DIR_NAME..DIR_NAME + 8]);
        ext.copy_from_slice(&raw[DIR_EXT..DIR_EXT + 3]);
        
        Some(Self {
            name,
            ext,
            attributes: raw[DIR_ATTR],
            first_cluster: u16::from_le_bytes([raw[DIR_FST_CLUS_LO], raw[DIR_FST_CLUS_LO + 1]]),
            size: u32::from_le_bytes([
                raw[DIR_FILE_SIZE],
                raw[DIR_FILE_SIZE + 1],
                raw[DIR_FILE_SIZE + 2],
                raw[DIR_FILE_SIZE + 3],
            ]),
        })
    }
    
    /// Display form, e.g. `KERNEL.ELF`
    pub fn short_name(&self) -> String {
        let base = String::from_utf8_lossy(&self.name).trim_end().to_string();
        let ext = String::from_utf8_lossy(&self.ext).trim_end().to_string();
        if ext.is_empty() {
            base
        } else {
            format!("{}.{}", base, ext)
        }
    }
    
    fn same_name(&self, other: &DirEntry) -> bool {
        self.name == other.name && self.ext == other.ext
    }
}

/// Upper-case, truncate to N and space-pad one half of an 8.3 name
fn short_name_field<const N: usize>(part: &str) -> Result<[u8; N], ImageError> {
    let mut field = [b' '; N];
    
    for (slot, byte) in field.iter_mut().zip(part.bytes()) {
        let byte = byte.to_ascii_uppercase();
        if !is_valid_83_char(byte) {
            return Err(ImageError::InvalidName(part.to_string()));
        }
        *slot = byte;
    }
    
    Ok(field)
}

/// Check if a character is valid for 8.3 filenames
fn is_valid_83_char(c: u8) -> bool {
    matches!(
        c,
        b'A'..=b'Z' | b'0'..=b'9' | b'!' | b'#' | b'$' | b'%' | b'&' |
        b'\'' | b'(' | b')' | b'-' | b'@' | b'^' | b'_' | b'`' |
        b'{' | b'}' | b'~'
    )
}

/// The fixed-size root directory region
#[derive(Debug, Clone)]
pub struct RootDirectory {
    data: Vec<u8>,
    entries: Vec<DirEntry>,
    capacity: u16,
}

impl RootDirectory {
    pub fn new(geometry: &Fat12Geometry) -> Self {
        Self {
            data: vec![0u8; geometry.root_dir_size_bytes()],
            entries: Vec::new(),
            capacity: geometry.root_entries,
        }
    }
    
    pub fn capacity(&self) -> u16 {
        self.capacity
    }
    
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity as usize
    }
    
    pub fn entries(&self) -> &[DirEntry] {
        &self.entries
    }
    
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
    
    pub fn contains(&self, entry: &DirEntry) -> bool {
        self.entries.iter().any(|e| e.same_name(entry))
    }
    
    /// Check that `entry` could be appended without writing it
    pub fn check_insert(&self, entry: &DirEntry) -> Result<(), ImageError> {
        if self.is_full() {
            return Err(ImageError::DirectoryFull {
                file: entry.short_name(),
                capacity: self.capacity,
            });
        }
        if self.contains(entry) {
            return Err(ImageError::DuplicateName(entry.short_name()));
        }
        Ok(())
    }
    
    /// Append a record in the next free slot
    pub fn push(&mut self, entry: DirEntry) -> Result<(), ImageError> {
        self.check_insert(&entry)?;
        
        let offset = self.entries.len() * DIR_ENTRY_SIZE;
        self.data[offset..offset + DIR_ENTRY_SIZE].copy_from_slice(&entry.to_bytes());
        self.entries.push(entry);
        Ok(())
    }
}
