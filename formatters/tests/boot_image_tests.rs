// End-to-end tests for building a FAT12 boot image on disk

use bootimg_core::{BuildOptions, ImageError, ImageFile};
use bootimg_formatters::fat12::Fat12Reader;
use bootimg_formatters::partition::read_partition_entry;
use bootimg_formatters::{BootImageFormatter, Fat12Verifier};
use std::path::PathBuf;
use tempfile::TempDir;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A scratch directory with a 512-byte boot loader in it
fn workspace() -> (TempDir, PathBuf, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let boot = dir.path().join("boot.bin");
    let mut loader = vec![0x90u8; 512];
    loader[510] = 0x55;
    loader[511] = 0xAA;
    std::fs::write(&boot, &loader).unwrap();
    let image = dir.path().join("fs.img");
    (dir, boot, image)
}

fn payload(len: usize, seed: u8) -> Vec<u8> {
    (0..len).map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed)).collect()
}

#[test]
fn test_build_writes_image_and_patches_loader() {
    init_logging();
    let (_dir, boot, image_path) = workspace();
    let files = vec![
        ImageFile::new("KERNEL", "ELF", payload(100, 1)),
        ImageFile::new("USER", "ELF", payload(513, 2)),
    ];
    
    let report = BootImageFormatter::default().format(&boot, &image_path, &files).unwrap();
    assert_eq!(report.total_sectors, 2880);
    assert_eq!(report.files[0].run.start, 2);
    assert_eq!(report.files[0].run.count, 1);
    assert_eq!(report.files[1].run.start, 3);
    assert_eq!(report.files[1].run.count, 2);
    
    let image = std::fs::read(&image_path).unwrap();
    assert_eq!(image.len(), 2880 * 512);
    
    let reader = Fat12Reader::new(&image).unwrap();
    let entries = reader.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!((entries[0].first_cluster, entries[0].size), (2, 100));
    assert_eq!((entries[1].first_cluster, entries[1].size), (3, 513));
    assert_eq!(reader.fat().chain(3), vec![3, 4]);
    assert_eq!(reader.read_file(&entries[1]).unwrap(), files[1].data);
    
    let loader = std::fs::read(&boot).unwrap();
    let extent = read_partition_entry(&loader).unwrap();
    assert_eq!(extent.start_lba, 63);
    assert_eq!(extent.size_sectors, 2880);
    // Everything outside the two fields is untouched
    assert_eq!(&loader[..0x1C6], &[0x90u8; 0x1C6][..]);
    assert_eq!(&loader[510..], &[0x55, 0xAA]);
    
    assert!(Fat12Verifier::verify_file(&image_path).unwrap().is_valid);
}

#[test]
fn test_capacity_exceeded_leaves_no_image() {
    init_logging();
    let (dir, boot, image_path) = workspace();
    let files = vec![
        ImageFile::new("KERNEL", "ELF", payload(4096, 3)),
        ImageFile::new("HUGE", "BIN", payload(2847 * 512, 4)),
    ];
    
    let err = BootImageFormatter::default().format(&boot, &image_path, &files).unwrap_err();
    match err {
        ImageError::CapacityExceeded { file, needed, available } => {
            assert_eq!(file, "HUGE.BIN");
            assert_eq!(needed, 2847);
            assert_eq!(available, 2847 - 8);
        }
        other => panic!("expected CapacityExceeded, got {:?}", other),
    }
    
    assert!(!image_path.exists());
    // No temporary files are left behind either
    let leftovers: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(leftovers.len(), 1);
    // And the loader was not patched
    assert_eq!(read_partition_entry(&std::fs::read(&boot).unwrap()).unwrap().size_sectors, 0x9090_9090);
}

#[test]
fn test_exact_fit_succeeds() {
    let (_dir, boot, image_path) = workspace();
    let files = vec![ImageFile::new("FULL", "BIN", payload(2847 * 512, 5))];
    
    let report = BootImageFormatter::default().format(&boot, &image_path, &files).unwrap();
    assert_eq!(report.clusters_free, 0);
    assert_eq!(report.files[0].run.last(), 2848);
}

#[test]
fn test_small_boot_loader_rejected_before_writing() {
    let (_dir, boot, image_path) = workspace();
    std::fs::write(&boot, vec![0u8; 200]).unwrap();
    let files = vec![ImageFile::new("KERNEL", "ELF", payload(10, 6))];
    
    let err = BootImageFormatter::default().format(&boot, &image_path, &files).unwrap_err();
    assert!(matches!(err, ImageError::BootLoaderTooSmall { len: 200 }));
    assert!(!image_path.exists());
}

#[test]
fn test_directory_full() {
    let (_dir, boot, image_path) = workspace();
    let files: Vec<ImageFile> = (0..225)
        .map(|i| ImageFile::new(format!("P{}", i), "ELF", vec![i as u8 + 1]))
        .collect();
    
    let err = BootImageFormatter::default().format(&boot, &image_path, &files).unwrap_err();
    match err {
        ImageError::DirectoryFull { file, capacity } => {
            assert_eq!(file, "P224.ELF");
            assert_eq!(capacity, 224);
        }
        other => panic!("expected DirectoryFull, got {:?}", other),
    }
    assert!(!image_path.exists());
}

#[test]
fn test_zero_length_and_duplicates_rejected() {
    let formatter = BootImageFormatter::default();
    
    let empty = vec![
        ImageFile::new("KERNEL", "ELF", payload(10, 7)),
        ImageFile::new("EMPTY", "ELF", Vec::new()),
    ];
    assert!(matches!(formatter.dry_run(&empty), Err(ImageError::ZeroLengthFile(name)) if name == "EMPTY.ELF"));
    
    let dups = vec![
        ImageFile::new("program1", "ELF", payload(10, 8)),
        ImageFile::new("PROGRAM10", "ELF", payload(10, 9)),
    ];
    assert!(matches!(formatter.dry_run(&dups), Err(ImageError::DuplicateName(name)) if name == "PROGRAM1.ELF"));
}

#[test]
fn test_options_flow_into_image() {
    let (_dir, boot, image_path) = workspace();
    let options = BuildOptions {
        volume_label: "testvol".to_string(),
        volume_serial: 0xDEAD_BEEF,
        partition_start: 2048,
        verify_after_build: true,
    };
    let files = vec![ImageFile::new("KERNEL", "ELF", payload(700, 10))];
    
    let report = BootImageFormatter::new(options).format(&boot, &image_path, &files).unwrap();
    assert_eq!(report.partition.start_lba, 2048);
    
    let image = std::fs::read(&image_path).unwrap();
    assert_eq!(&image[0x2B..0x36], b"TESTVOL    ");
    assert_eq!(&image[0x27..0x2B], &0xDEAD_BEEFu32.to_le_bytes());
    assert_eq!(read_partition_entry(&std::fs::read(&boot).unwrap()).unwrap().start_lba, 2048);
}

#[test]
fn test_rebuild_overwrites_existing_image() {
    let (_dir, boot, image_path) = workspace();
    std::fs::write(&image_path, b"stale").unwrap();
    let files = vec![ImageFile::new("KERNEL", "ELF", payload(10, 11))];
    
    BootImageFormatter::default().format(&boot, &image_path, &files).unwrap();
    assert_eq!(std::fs::metadata(&image_path).unwrap().len(), 2880 * 512);
}
