// Contiguous cluster allocator
// A single cursor walks forward from cluster 2; clusters are never freed

use bootimg_core::ImageError;
use log::debug;
use crate::fat_common::cluster_io::clusters_needed;
use crate::fat_common::constants::FIRST_DATA_CLUSTER;
use super::{Fat12Geometry, Fat12Table};

/// A run of consecutive clusters handed out for one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterRun {
    pub start: u32,
    pub count: u32,
}

impl ClusterRun {
    pub fn clusters(&self) -> impl Iterator<Item = u32> {
        self.start..self.start + self.count
    }
    
    pub fn last(&self) -> u32 {
        self.start + self.count - 1
    }
    
    /// Write the run into the FAT as a single chain ending in EOC
    pub fn link_into(&self, fat: &mut Fat12Table) {
        fat.link_contiguous(self.start, self.count);
    }
}

#[derive(Debug, Clone)]
pub struct ClusterAllocator {
    next_free: u32,
    max_cluster: u32,
    cluster_size: u32,
}

impl ClusterAllocator {
    pub fn new(geometry: &Fat12Geometry) -> Self {
        Self {
            next_free: FIRST_DATA_CLUSTER,
            max_cluster: geometry.max_cluster(),
            cluster_size: geometry.cluster_size(),
        }
    }
    
    pub fn next_free(&self) -> u32 {
        self.next_free
    }
    
    /// Clusters still available in the data region
    pub fn remaining(&self) -> u32 {
        (self.max_cluster + 1).saturating_sub(self.next_free)
    }
    
    pub fn used(&self) -> u32 {
        self.next_free - FIRST_DATA_CLUSTER
    }
    
    /// Reserve enough clusters for `len` bytes of `file`
    pub fn allocate(&mut self, file: &str, len: u64) -> Result<ClusterRun, ImageError> {
        if len == 0 {
            return Err(ImageError::ZeroLengthFile(file.to_string()));
        }
        
        let needed = clusters_needed(len, self.cluster_size);
        let available = self.remaining();
        if needed > available {
            return Err(ImageError::CapacityExceeded {
                file: file.to_string(),
                needed,
                available,
            });
        }
        
        let run = ClusterRun {
            start: self.next_free,
            count: needed,
        };
        self.next_free += needed;
        
        debug!("Allocated clusters {}..={} ({} clusters) for {}", run.start, run.last(), run.count, file);
        Ok(run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fat12::FLOPPY_1440;
    
    #[test]
    fn test_runs_are_sequential() {
        let mut alloc = ClusterAllocator::new(&FLOPPY_1440);
        
        let a = alloc.allocate("A.BIN", 100).unwrap();
        let b = alloc.allocate("B.BIN", 513).unwrap();
        let c = alloc.allocate("C.BIN", 512).unwrap();
        
        assert_eq!(a, ClusterRun { start: 2, count: 1 });
        assert_eq!(b, ClusterRun { start: 3, count: 2 });
        assert_eq!(c, ClusterRun { start: 5, count: 1 });
        assert_eq!(b.clusters().collect::<Vec<_>>(), vec![3, 4]);
        assert_eq!(alloc.next_free(), 6);
        assert_eq!(alloc.used(), 4);
    }
    
    #[test]
    fn test_zero_length_rejected() {
        let mut alloc = ClusterAllocator::new(&FLOPPY_1440);
        assert!(matches!(
            alloc.allocate("EMPTY.TXT", 0),
            Err(ImageError::ZeroLengthFile(name)) if name == "EMPTY.TXT"
        ));
        assert_eq!(alloc.next_free(), 2);
    }
    
    #[test]
    fn test_fill_to_capacity_then_fail() {
        let mut alloc = ClusterAllocator::new(&FLOPPY_1440);
        let total = FLOPPY_1440.data_clusters();
        
        let run = alloc.allocate("BIG.BIN", total as u64 * 512).unwrap();
        assert_eq!(run.last(), FLOPPY_1440.max_cluster());
        assert_eq!(alloc.remaining(), 0);
        
        match alloc.allocate("ONE.BIN", 1) {
            Err(ImageError::CapacityExceeded { needed, available, .. }) => {
                assert_eq!(needed, 1);
                assert_eq!(available, 0);
            }
            other => panic!("expected CapacityExceeded, got {:?}", other),
        }
    }
    
    #[test]
    fn test_failed_allocation_does_not_advance() {
        let mut alloc = ClusterAllocator::new(&FLOPPY_1440);
        alloc.allocate("A.BIN", 10 * 512).unwrap();
        assert!(alloc.allocate("HUGE.BIN", 3000 * 512).is_err());
        assert_eq!(alloc.next_free(), 12);
    }
}
