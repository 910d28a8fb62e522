pub mod boot_sector;
pub mod cluster_io;
pub mod constants;
