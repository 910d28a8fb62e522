// FAT12 boot image construction
// Geometry, FAT packing, cluster allocation, root directory and read-back

pub mod allocator;
pub mod builder;
pub mod directory;
pub mod fat_table;
pub mod geometry;
pub mod reader;
pub mod verifier;

pub use allocator::{ClusterAllocator, ClusterRun};
pub use builder::{Fat12Image, Fat12ImageBuilder, PlacedFile};
pub use directory::{DirEntry, RootDirectory};
pub use fat_table::Fat12Table;
pub use geometry::{Fat12Geometry, FLOPPY_1440};
pub use reader::Fat12Reader;
pub use verifier::{Fat12Verifier, VerificationResult};
