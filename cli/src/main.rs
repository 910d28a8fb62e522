use std::path::PathBuf;
use anyhow::Context;
use bootimg_core::{BuildOptions, ImageManifest};
use bootimg_formatters::{BootImageFormatter, BuildReport};
use clap::Parser;

mod discover;

#[derive(Parser)]
#[command(name = "bootimg")]
#[command(about = "Build a bootable FAT12 image and record it in the boot loader's partition table", long_about = None)]
struct Cli {
    /// Boot loader binary; its partition entry is patched in place
    boot_loader: PathBuf,
    /// Output image path
    image: PathBuf,
    /// Build tree searched for kernel.elf and user/*/*.elf
    #[arg(long, default_value = ".")]
    root: PathBuf,
    /// JSON manifest listing the files instead of searching the build tree
    #[arg(short, long)]
    manifest: Option<PathBuf>,
    /// Volume label (up to 11 characters)
    #[arg(long)]
    label: Option<String>,
    /// Volume serial number, in hex
    #[arg(long, value_parser = parse_hex_u32)]
    serial: Option<u32>,
    /// Check the built image's structure before it is written
    #[arg(long)]
    verify: bool,
    /// Build in memory and print the layout without writing anything
    #[arg(long)]
    dry_run: bool,
    /// More output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_hex_u32(s: &str) -> Result<u32, String> {
    let digits = s.trim_start_matches("0x").trim_start_matches("0X");
    u32::from_str_radix(digits, 16).map_err(|e| format!("invalid hex serial '{}': {}", s, e))
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn print_report(report: &BuildReport) {
    match &report.image_path {
        Some(path) => println!("Image: {}", path.display()),
        None => println!("Image: (dry run, nothing written)"),
    }
    println!("  Sectors: {}", report.total_sectors);
    println!(
        "  Partition: start LBA {}, {} sectors",
        report.partition.start_lba, report.partition.size_sectors
    );
    println!("  Clusters: {} used, {} free", report.clusters_used, report.clusters_free);
    println!();
    for file in &report.files {
        println!(
            "  {:<12} {:>8} bytes  clusters {}..={}",
            file.name,
            file.size,
            file.run.start,
            file.run.last()
        );
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    
    let mut options = BuildOptions::default();
    let files = match &cli.manifest {
        Some(path) => {
            let manifest = ImageManifest::load(path)
                .with_context(|| format!("Failed to load manifest {}", path.display()))?;
            manifest.apply_to(&mut options);
            manifest.read_files()?
        }
        None => discover::discover_files(&cli.root)
            .with_context(|| format!("Failed to collect input files under {}", cli.root.display()))?,
    };
    
    if let Some(label) = cli.label {
        options.volume_label = label;
    }
    if let Some(serial) = cli.serial {
        options.volume_serial = serial;
    }
    options.verify_after_build |= cli.verify;
    
    let formatter = BootImageFormatter::new(options);
    let report = if cli.dry_run {
        formatter.dry_run(&files)?
    } else {
        formatter
            .format(&cli.boot_loader, &cli.image, &files)
            .with_context(|| format!("Failed to build {}", cli.image.display()))?
    };
    
    print_report(&report);
    Ok(())
}
