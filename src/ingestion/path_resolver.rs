use std::{
    collections::{BTreeMap, HashSet},
    fs::{self, File},
    io::ErrorKind,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::model::{cli_error::CliError, file_entry::FileEntry};

/// Expand the path arguments into the regular files they name or contain.
///
/// Directories are walked recursively without descending into symlinked
/// directories; symlinks to regular files are kept. A file named directly must
/// be readable. The result is sorted by path and holds each file once, even
/// when it is reachable from several arguments.
pub fn resolve_paths(paths: &[PathBuf]) -> Result<Vec<FileEntry>, CliError> {
    let mut files = BTreeMap::new();
    let mut seen = HashSet::new();

    for path in paths {
        let metadata = fs::metadata(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => CliError::PathNotFound(path.clone()),
            _ => CliError::Io(e),
        })?;

        if metadata.is_file() {
            File::open(path)?;
            add_file(&mut files, &mut seen, path, metadata.len())?;
        } else if metadata.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = match entry {
                    Ok(entry) => entry,
                    // A missing root is caught above, so this is an unreadable subdirectory
                    Err(e) if e.depth() > 0 => {
                        warn!(error = %e, "Skipping unreadable entry");
                        continue;
                    }
                    Err(e) => return Err(e.into()),
                };

                let len = if entry.file_type().is_file() {
                    entry.metadata()?.len()
                } else if entry.file_type().is_symlink() {
                    match fs::metadata(entry.path()) {
                        Ok(target) if target.is_file() => target.len(),
                        Ok(_) => continue,
                        Err(e) => {
                            warn!(path = %entry.path().display(), error = %e, "Skipping broken symlink");
                            continue;
                        }
                    }
                } else {
                    continue;
                };

                add_file(&mut files, &mut seen, entry.path(), len)?;
            }
        } else {
            debug!(path = %path.display(), "Ignoring path that is neither file nor directory");
        }
    }

    Ok(files.into_values().collect())
}

fn add_file(
    files: &mut BTreeMap<PathBuf, FileEntry>,
    seen: &mut HashSet<PathBuf>,
    path: &Path,
    size: u64,
) -> Result<(), CliError> {
    let canonical = fs::canonicalize(path)?;
    if seen.insert(canonical) {
        files.insert(path.to_path_buf(), FileEntry::new(path, size));
    }
    Ok(())
}
