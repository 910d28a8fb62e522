use serde::{Deserialize, Serialize};

/// Volume label written when none is configured
pub const DEFAULT_VOLUME_LABEL: &str = "VCORE";
/// Volume serial written when none is configured
pub const DEFAULT_VOLUME_SERIAL: u32 = 0x1234_5678;
/// LBA of the first partition sector recorded in the boot loader
pub const DEFAULT_PARTITION_START: u32 = 63;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    pub volume_label: String,
    pub volume_serial: u32,
    pub partition_start: u32,
    pub verify_after_build: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            volume_label: DEFAULT_VOLUME_LABEL.to_string(),
            volume_serial: DEFAULT_VOLUME_SERIAL,
            partition_start: DEFAULT_PARTITION_START,
            verify_after_build: false,
        }
    }
}

impl BuildOptions {
    /// Label as the 11 space-padded bytes stored in the boot sector.
    /// Characters outside printable ASCII become `_`.
    pub fn label_bytes(&self) -> [u8; 11] {
        let mut label = [0x20u8; 11];
        for (slot, ch) in label.iter_mut().zip(self.volume_label.chars()) {
            *slot = if ch == ' ' || ch.is_ascii_graphic() {
                ch.to_ascii_uppercase() as u8
            } else {
                b'_'
            };
        }
        label
    }
}
