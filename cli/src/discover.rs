// Input discovery for the OS build tree
// kernel.elf first, then user/user1/user.elf, then every other user/*/*.elf

use std::path::{Path, PathBuf};
use bootimg_core::{ImageError, ImageFile};
use log::debug;

const KERNEL_PATH: &str = "kernel.elf";
const USER_DIR: &str = "user";
const FIRST_USER_DIR: &str = "user1";
const FIRST_USER_BINARY: &str = "user.elf";
const BINARY_EXT: &str = "elf";

fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>, ImageError> {
    let entries = std::fs::read_dir(dir).map_err(|source| ImageError::InvalidInputFile {
        path: dir.to_path_buf(),
        source,
    })?;
    
    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ImageError::InvalidInputFile {
            path: dir.to_path_buf(),
            source,
        })?;
        paths.push(entry.path());
    }
    paths.sort();
    Ok(paths)
}

fn is_first_user_binary(path: &Path) -> bool {
    let in_user1 = path
        .parent()
        .and_then(Path::file_name)
        .map_or(false, |dir| dir == FIRST_USER_DIR);
    let is_user_elf = path
        .file_name()
        .and_then(|n| n.to_str())
        .map_or(false, |n| n.eq_ignore_ascii_case(FIRST_USER_BINARY));
    in_user1 && is_user_elf
}

/// Every `user/<program>/<name>.elf`, sorted by path
fn user_programs(root: &Path) -> Result<Vec<PathBuf>, ImageError> {
    let mut programs = Vec::new();
    
    for program_dir in read_dir_sorted(&root.join(USER_DIR))? {
        if !program_dir.is_dir() {
            continue;
        }
        for path in read_dir_sorted(&program_dir)? {
            let is_elf = path.extension().map_or(false, |ext| ext == BINARY_EXT);
            if is_elf && path.is_file() && !is_first_user_binary(&path) {
                programs.push(path);
            }
        }
    }
    
    Ok(programs)
}

/// 8.3 base name for a program binary: upper-cased stem, at most 8 characters
fn program_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_uppercase())
        .unwrap_or_default()
        .chars()
        .take(8)
        .collect()
}

/// Collect the files for the boot image from a build tree rooted at `root`
pub fn discover_files(root: &Path) -> Result<Vec<ImageFile>, ImageError> {
    let ext = BINARY_EXT.to_uppercase();
    let mut files = vec![
        ImageFile::from_path("KERNEL", ext.as_str(), &root.join(KERNEL_PATH))?,
        ImageFile::from_path(
            "USER",
            ext.as_str(),
            &root.join(USER_DIR).join(FIRST_USER_DIR).join(FIRST_USER_BINARY),
        )?,
    ];
    
    for path in user_programs(root)? {
        let name = program_name(&path);
        debug!("Discovered {} as {}.{}", path.display(), name, ext);
        files.push(ImageFile::from_path(name, ext.as_str(), &path)?);
    }
    
    Ok(files)
}
