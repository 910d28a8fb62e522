pub mod boot_image;
pub mod fat12;
pub mod fat_common;
pub mod partition;

pub use boot_image::{BootImageFormatter, BuildReport};
pub use fat12::{Fat12Image, Fat12ImageBuilder, Fat12Reader, Fat12Verifier, FLOPPY_1440};
pub use partition::PartitionExtent;
