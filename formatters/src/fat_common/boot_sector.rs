// Boot sector builder for FAT12 images
// Writes the BPB plus extended BPB into a 512-byte sector

use bootimg_core::BuildOptions;
use bootimg_core::options::DEFAULT_VOLUME_SERIAL;
use super::constants::*;
use crate::fat12::Fat12Geometry;

/// Fixed boot sector fields that are not part of the geometry
#[derive(Debug, Clone)]
pub struct Fat12BootSectorParams {
    pub oem_name: [u8; 8],
    pub media_descriptor: u8,
    pub sectors_per_track: u16,
    pub num_heads: u16,
    pub hidden_sectors: u32,
    pub drive_number: u8,
    pub volume_serial: u32,
    pub volume_label: [u8; 11],
}

impl Default for Fat12BootSectorParams {
    fn default() -> Self {
        Self {
            oem_name: *b"MSWIN4.1",
            media_descriptor: MEDIA_FIXED,
            sectors_per_track: 32,
            num_heads: 64,
            hidden_sectors: 0,
            drive_number: 0,
            volume_serial: DEFAULT_VOLUME_SERIAL,
            volume_label: BuildOptions::default().label_bytes(),
        }
    }
}

impl Fat12BootSectorParams {
    pub fn from_options(options: &BuildOptions) -> Self {
        Self {
            volume_serial: options.volume_serial,
            volume_label: options.label_bytes(),
            ..Default::default()
        }
    }
}

/// Build a FAT12 boot sector
pub fn build_fat12_boot_sector(
    params: &Fat12BootSectorParams,
    geometry: &Fat12Geometry,
) -> [u8; BOOT_SECTOR_SIZE] {
    let mut boot_sector = [0u8; BOOT_SECTOR_SIZE];
    
    boot_sector[BS_JMP_BOOT..BS_JMP_BOOT + 3].copy_from_slice(&JUMP_BOOT);
    boot_sector[BS_OEM_NAME..BS_OEM_NAME + 8].copy_from_slice(&params.oem_name);
    
    // BPB
    boot_sector[BPB_BYTES_PER_SEC..BPB_BYTES_PER_SEC + 2]
        .copy_from_slice(&geometry.bytes_per_sector.to_le_bytes());
    boot_sector[BPB_SEC_PER_CLUS] = geometry.sectors_per_cluster;
    boot_sector[BPB_RSVD_SEC_CNT..BPB_RSVD_SEC_CNT + 2]
        .copy_from_slice(&geometry.reserved_sectors.to_le_bytes());
    boot_sector[BPB_NUM_FATS] = geometry.num_fats;
    boot_sector[BPB_ROOT_ENT_CNT..BPB_ROOT_ENT_CNT + 2]
        .copy_from_slice(&geometry.root_entries.to_le_bytes());
    boot_sector[BPB_TOT_SEC16..BPB_TOT_SEC16 + 2]
        .copy_from_slice(&geometry.total_sectors.to_le_bytes());
    boot_sector[BPB_MEDIA] = params.media_descriptor;
    boot_sector[BPB_FAT_SZ16..BPB_FAT_SZ16 + 2]
        .copy_from_slice(&geometry.sectors_per_fat.to_le_bytes());
    boot_sector[BPB_SEC_PER_TRK..BPB_SEC_PER_TRK + 2]
        .copy_from_slice(&params.sectors_per_track.to_le_bytes());
    boot_sector[BPB_NUM_HEADS..BPB_NUM_HEADS + 2]
        .copy_from_slice(&params.num_heads.to_le_bytes());
    boot_sector[BPB_HIDD_SEC..BPB_HIDD_SEC + 4]
        .copy_from_slice(&params.hidden_sectors.to_le_bytes());
    // Total sectors fit the 16-bit field, so the 32-bit count stays zero
    boot_sector[BPB_TOT_SEC32..BPB_TOT_SEC32 + 4]
        .copy_from_slice(&0u32.to_le_bytes());
    
    // Extended BPB
    boot_sector[BS_DRV_NUM] = params.drive_number;
    boot_sector[BS_RESERVED1] = 0;
    boot_sector[BS_BOOT_SIG] = EXTENDED_BOOT_SIGNATURE;
    boot_sector[BS_VOL_ID..BS_VOL_ID + 4]
        .copy_from_slice(&params.volume_serial.to_le_bytes());
    boot_sector[BS_VOL_LAB..BS_VOL_LAB + 11]
        .copy_from_slice(&params.volume_label);
    boot_sector[BS_FIL_SYS_TYPE..BS_FIL_SYS_TYPE + 8]
        .copy_from_slice(FAT12_FS_TYPE);
    
    boot_sector[BOOT_SIGNATURE_OFFSET..BOOT_SIGNATURE_OFFSET + 2]
        .copy_from_slice(&BOOT_SIGNATURE);
    
    boot_sector
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fat12::FLOPPY_1440;
    
    #[test]
    fn test_floppy_boot_sector_layout() {
        let bs = build_fat12_boot_sector(&Fat12BootSectorParams::default(), &FLOPPY_1440);
        
        assert_eq!(&bs[0..3], &[0xEB, 0x3C, 0x90]);
        assert_eq!(&bs[3..11], b"MSWIN4.1");
        assert_eq!(u16::from_le_bytes([bs[11], bs[12]]), 512);
        assert_eq!(bs[13], 1);
        assert_eq!(u16::from_le_bytes([bs[14], bs[15]]), 1);
        assert_eq!(bs[16], 2);
        assert_eq!(u16::from_le_bytes([bs[17], bs[18]]), 224);
        assert_eq!(u16::from_le_bytes([bs[19], bs[20]]), 2880);
        assert_eq!(bs[21], 0xF8);
        assert_eq!(u16::from_le_bytes([bs[22], bs[23]]), 9);
        assert_eq!(u16::from_le_bytes([bs[24], bs[25]]), 32);
        assert_eq!(u16::from_le_bytes([bs[26], bs[27]]), 64);
        assert_eq!(&bs[28..38], &[0u8; 10]);
        assert_eq!(bs[38], 0x29);
        assert_eq!(u32::from_le_bytes([bs[39], bs[40], bs[41], bs[42]]), 0x1234_5678);
        assert_eq!(&bs[43..54], b"VCORE      ");
        assert_eq!(&bs[54..62], b"FAT12   ");
        assert!(bs[62..510].iter().all(|&b| b == 0));
        assert_eq!(&bs[510..512], &[0x55, 0xAA]);
    }
    
    #[test]
    fn test_params_from_options() {
        let options = BuildOptions {
            volume_label: "osdisk".to_string(),
            volume_serial: 0xCAFE_F00D,
            ..Default::default()
        };
        let bs = build_fat12_boot_sector(&Fat12BootSectorParams::from_options(&options), &FLOPPY_1440);
        
        assert_eq!(&bs[BS_VOL_LAB..BS_VOL_LAB + 11], b"OSDISK     ");
        assert_eq!(&bs[BS_VOL_ID..BS_VOL_ID + 4], &0xCAFE_F00Du32.to_le_bytes());
    }
}
