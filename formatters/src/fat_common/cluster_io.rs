// Data region access for FAT12 images held in memory
// Files occupy contiguous cluster runs, so a run maps to one byte range

use std::io;
use std::ops::Range;
use crate::fat12::{ClusterRun, Fat12Geometry};
use super::constants::FIRST_DATA_CLUSTER;

/// Calculate how many clusters are needed for a given size
pub fn clusters_needed(size: u64, bytes_per_cluster: u32) -> u32 {
    size.div_ceil(bytes_per_cluster as u64) as u32
}

/// Byte range a run covers in the image
pub fn run_range(geometry: &Fat12Geometry, run: &ClusterRun) -> Range<usize> {
    let start = geometry.cluster_offset(run.start) as usize;
    start..start + run.count as usize * geometry.cluster_size() as usize
}

/// Run range checked against the data region and the image length
fn checked_range(image_len: usize, geometry: &Fat12Geometry, run: &ClusterRun) -> io::Result<Range<usize>> {
    if run.start < FIRST_DATA_CLUSTER {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Cluster {} is reserved", run.start),
        ));
    }
    let range = run_range(geometry, run);
    if range.end > image_len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("Cluster range {:#x}..{:#x} is past the end of a {} byte image", range.start, range.end, image_len),
        ));
    }
    Ok(range)
}

/// Copy `data` to the start of a run; the image is already zeroed past it
pub fn copy_run(image: &mut [u8], geometry: &Fat12Geometry, run: &ClusterRun, data: &[u8]) -> io::Result<()> {
    let range = checked_range(image.len(), geometry, run)?;
    if data.len() > range.len() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} bytes do not fit in {} clusters", data.len(), run.count),
        ));
    }
    
    image[range.start..range.start + data.len()].copy_from_slice(data);
    Ok(())
}

/// First `len` bytes stored in a run
pub fn read_run<'a>(image: &'a [u8], geometry: &Fat12Geometry, run: &ClusterRun, len: usize) -> io::Result<&'a [u8]> {
    let range = checked_range(image.len(), geometry, run)?;
    if len > range.len() {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("Run of {} clusters holds fewer than {} bytes", run.count, len),
        ));
    }
    Ok(&image[range.start..range.start + len])
}

/// Gather `len` bytes following an arbitrary cluster chain
pub fn read_chain(image: &[u8], geometry: &Fat12Geometry, clusters: &[u32], len: usize) -> io::Result<Vec<u8>> {
    let mut data = Vec::with_capacity(len);
    
    for &cluster in clusters {
        if data.len() >= len {
            break;
        }
        let chunk = read_run(image, geometry, &ClusterRun { start: cluster, count: 1 }, geometry.cluster_size() as usize)?;
        let take = chunk.len().min(len - data.len());
        data.extend_from_slice(&chunk[..take]);
    }
    
    if data.len() < len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("Chain of {} clusters holds {} of {} bytes", clusters.len(), data.len(), len),
        ));
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fat12::FLOPPY_1440;
    
    #[test]
    fn test_clusters_needed() {
        assert_eq!(clusters_needed(0, 512), 0);
        assert_eq!(clusters_needed(1, 512), 1);
        assert_eq!(clusters_needed(512, 512), 1);
        assert_eq!(clusters_needed(513, 512), 2);
        assert_eq!(clusters_needed(1024, 512), 2);
    }
    
    #[test]
    fn test_run_range() {
        let run = ClusterRun { start: 3, count: 2 };
        assert_eq!(run_range(&FLOPPY_1440, &run), 0x4400..0x4800);
    }
    
    #[test]
    fn test_copy_then_read_run() {
        let mut image = vec![0u8; FLOPPY_1440.image_size()];
        let data: Vec<u8> = (0..700u32).map(|i| i as u8).collect();
        let run = ClusterRun { start: 2, count: 2 };
        
        copy_run(&mut image, &FLOPPY_1440, &run, &data).unwrap();
        
        assert_eq!(read_run(&image, &FLOPPY_1440, &run, 700).unwrap(), &data[..]);
        // Nothing spills into the metadata area or past the data
        assert!(image[..0x4200].iter().all(|&b| b == 0));
        assert!(image[0x4200 + 700..].iter().all(|&b| b == 0));
    }
    
    #[test]
    fn test_copy_larger_than_run() {
        let mut image = vec![0u8; FLOPPY_1440.image_size()];
        let err = copy_run(&mut image, &FLOPPY_1440, &ClusterRun { start: 2, count: 1 }, &[1u8; 600]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
    
    #[test]
    fn test_run_past_image_end() {
        let mut image = vec![0u8; FLOPPY_1440.image_size()];
        let run = ClusterRun { start: FLOPPY_1440.max_cluster(), count: 2 };
        assert_eq!(copy_run(&mut image, &FLOPPY_1440, &run, &[1u8; 4]).unwrap_err().kind(), io::ErrorKind::UnexpectedEof);
        assert!(read_run(&image, &FLOPPY_1440, &run, 4).is_err());
    }
    
    #[test]
    fn test_read_fragmented_chain() {
        let mut image = vec![0u8; FLOPPY_1440.image_size()];
        copy_run(&mut image, &FLOPPY_1440, &ClusterRun { start: 7, count: 1 }, &[0xAA; 512]).unwrap();
        copy_run(&mut image, &FLOPPY_1440, &ClusterRun { start: 4, count: 1 }, &[0xBB; 512]).unwrap();
        
        let data = read_chain(&image, &FLOPPY_1440, &[7, 4], 600).unwrap();
        assert_eq!(&data[..512], &[0xAA; 512][..]);
        assert_eq!(&data[512..], &[0xBB; 88][..]);
        assert!(read_chain(&image, &FLOPPY_1440, &[7], 600).is_err());
    }
    
    #[test]
    fn test_reserved_cluster_rejected() {
        let image = vec![0u8; FLOPPY_1440.image_size()];
        let err = read_chain(&image, &FLOPPY_1440, &[0], 10).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
