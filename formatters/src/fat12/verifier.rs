// FAT12 image verifier - re-reads a built image and checks its structure
use std::collections::HashSet;
use std::path::Path;
use bootimg_core::ImageError;
use log::{info, warn, error};
use crate::fat_common::cluster_io::clusters_needed;
use crate::fat_common::constants::*;
use super::{Fat12Reader, Fat12Table};

#[derive(Debug)]
pub struct VerificationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub info: Vec<String>,
}

impl VerificationResult {
    fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            info: Vec::new(),
        }
    }
    
    fn add_error(&mut self, msg: String) {
        error!("FAT12 verification error: {}", msg);
        self.is_valid = false;
        self.errors.push(msg);
    }
    
    fn add_warning(&mut self, msg: String) {
        warn!("FAT12 verification warning: {}", msg);
        self.warnings.push(msg);
    }
    
    fn add_info(&mut self, msg: String) {
        info!("FAT12 verification: {}", msg);
        self.info.push(msg);
    }
    
    /// Turn a failed verification into an error carrying every message
    pub fn into_result(self) -> Result<Self, ImageError> {
        if self.is_valid {
            Ok(self)
        } else {
            Err(ImageError::Verification(self.errors.join("; ")))
        }
    }
}

pub struct Fat12Verifier;

impl Fat12Verifier {
    pub fn verify_file(path: &Path) -> Result<VerificationResult, ImageError> {
        let image = std::fs::read(path)?;
        Self::verify_image(&image)
    }
    
    /// Check boot sector, FAT copies and every root directory chain
    pub fn verify_image(image: &[u8]) -> Result<VerificationResult, ImageError> {
        let reader = Fat12Reader::new(image)?;
        let mut result = VerificationResult::new();
        
        Self::verify_boot_sector(&reader, image.len(), &mut result);
        Self::verify_fat_tables(&reader, &mut result);
        Self::verify_root_directory(&reader, &mut result);
        
        Ok(result)
    }
    
    fn verify_boot_sector(reader: &Fat12Reader<'_>, image_len: usize, result: &mut VerificationResult) {
        let bs = reader.boot_sector();
        let geometry = reader.geometry();
        
        if !(bs[BS_JMP_BOOT] == 0xEB || bs[BS_JMP_BOOT] == 0xE9) {
            result.add_error(format!(
                "Invalid jump instruction: {:02X} {:02X} {:02X} (should start with EB or E9)",
                bs[0], bs[1], bs[2]
            ));
        }
        
        if bs[BOOT_SIGNATURE_OFFSET..BOOT_SIGNATURE_OFFSET + 2] != BOOT_SIGNATURE {
            result.add_error(format!(
                "Invalid boot signature: {:02X}{:02X} (should be 55AA)",
                bs[BOOT_SIGNATURE_OFFSET], bs[BOOT_SIGNATURE_OFFSET + 1]
            ));
        }
        
        if bs[BS_BOOT_SIG] != EXTENDED_BOOT_SIGNATURE {
            result.add_warning(format!("No extended boot signature (found {:#04x})", bs[BS_BOOT_SIG]));
        }
        
        if &bs[BS_FIL_SYS_TYPE..BS_FIL_SYS_TYPE + 8] != FAT12_FS_TYPE {
            result.add_error(format!(
                "Filesystem type is '{}', expected 'FAT12   '",
                String::from_utf8_lossy(&bs[BS_FIL_SYS_TYPE..BS_FIL_SYS_TYPE + 8])
            ));
        }
        
        if geometry.image_size() != image_len {
            result.add_error(format!(
                "Image is {} bytes but BPB describes {} sectors ({} bytes)",
                image_len, geometry.total_sectors, geometry.image_size()
            ));
        }
        
        // Cluster counts and FAT size were already checked when the reader parsed the BPB
        result.add_info(format!(
            "{} sectors, {} data clusters of {} bytes, data starts at sector {}",
            geometry.total_sectors, geometry.data_clusters(), geometry.cluster_size(), geometry.data_start_sector()
        ));
    }
    
    fn verify_fat_tables(reader: &Fat12Reader<'_>, result: &mut VerificationResult) {
        let primary = reader.fat_copy(0);
        for copy in 1..reader.geometry().num_fats {
            if reader.fat_copy(copy) != primary {
                result.add_error(format!("FAT copy {} differs from FAT copy 0", copy));
            }
        }
        
        let media = reader.boot_sector()[BPB_MEDIA];
        if primary[0] != media || primary[1] != 0xFF || primary[2] != 0xFF {
            result.add_error(format!(
                "Reserved FAT entries are {:02X} {:02X} {:02X}, expected {:02X} FF FF",
                primary[0], primary[1], primary[2], media
            ));
        }
    }
    
    fn verify_root_directory(reader: &Fat12Reader<'_>, result: &mut VerificationResult) {
        let geometry = reader.geometry();
        let fat = reader.fat();
        let mut claimed = HashSet::new();
        let mut names = HashSet::new();
        let entries = reader.entries();
        
        for entry in &entries {
            let name = entry.short_name();
            if !names.insert(name.clone()) {
                result.add_error(format!("Duplicate directory entry {}", name));
            }
            
            if entry.size == 0 {
                if entry.first_cluster != 0 {
                    result.add_warning(format!("{} is empty but owns cluster {}", name, entry.first_cluster));
                }
                continue;
            }
            
            let start = entry.first_cluster as u32;
            if start < FIRST_DATA_CLUSTER || start > geometry.max_cluster() {
                result.add_error(format!("{} starts at invalid cluster {}", name, start));
                continue;
            }
            
            let chain = fat.chain(start);
            let expected = clusters_needed(entry.size as u64, geometry.cluster_size());
            if chain.len() != expected as usize {
                result.add_error(format!(
                    "{}: chain has {} clusters, size {} needs {}",
                    name, chain.len(), entry.size, expected
                ));
            }
            
            if let Some(&last) = chain.last() {
                if !Fat12Table::is_end_of_chain(fat.entry(last)) {
                    result.add_error(format!(
                        "{}: chain ends at cluster {} with value {:#05x} instead of end-of-chain",
                        name, last, fat.entry(last)
                    ));
                }
            }
            
            for &cluster in &chain {
                if cluster > geometry.max_cluster() {
                    result.add_error(format!("{}: cluster {} is past the data region", name, cluster));
                }
                if !claimed.insert(cluster) {
                    result.add_error(format!("{}: cluster {} is cross-linked", name, cluster));
                }
            }
        }
        
        result.add_info(format!(
            "{} root directory entries, {} clusters in use",
            entries.len(), claimed.len()
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bootimg_core::{BuildOptions, ImageFile};
    use crate::fat12::Fat12ImageBuilder;
    
    fn sample_image() -> Vec<u8> {
        let files = [
            ImageFile::new("KERNEL", "ELF", vec![1u8; 4000]),
            ImageFile::new("USER", "ELF", vec![2u8; 513]),
            ImageFile::new("SH", "ELF", vec![3u8; 1]),
        ];
        Fat12ImageBuilder::build(&files, &BuildOptions::default()).unwrap().into_bytes()
    }
    
    #[test]
    fn test_built_image_verifies() {
        let result = Fat12Verifier::verify_image(&sample_image()).unwrap();
        assert!(result.is_valid, "errors: {:?}", result.errors);
        assert!(result.warnings.is_empty());
    }
    
    #[test]
    fn test_detects_diverging_fat_copy() {
        let mut image = sample_image();
        let second_fat = crate::fat12::FLOPPY_1440.fat_offset(1);
        image[second_fat + 3] ^= 0xFF;
        
        let result = Fat12Verifier::verify_image(&image).unwrap();
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.contains("FAT copy 1")));
        assert!(matches!(result.into_result(), Err(ImageError::Verification(_))));
    }
    
    #[test]
    fn test_detects_truncated_chain() {
        let mut image = sample_image();
        // KERNEL.ELF starts at cluster 2; end its chain early in both copies
        for copy in 0..2 {
            let offset = crate::fat12::FLOPPY_1440.fat_offset(copy);
            let mut fat = Fat12Table::from_bytes(image[offset..offset + 4608].to_vec());
            fat.mark_end_of_chain(2);
            image[offset..offset + 4608].copy_from_slice(fat.as_bytes());
        }
        
        let result = Fat12Verifier::verify_image(&image).unwrap();
        assert!(result.errors.iter().any(|e| e.contains("KERNEL.ELF")));
    }
    
    #[test]
    fn test_detects_wrong_length() {
        let mut image = sample_image();
        image.truncate(image.len() - 512);
        let result = Fat12Verifier::verify_image(&image).unwrap();
        assert!(!result.is_valid);
    }
}
