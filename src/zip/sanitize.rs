use std::path::{Component, Path, PathBuf};

use anyhow::{Result, bail};

/// Resolve an entry name to a path relative to the extraction root.
///
/// Rejects names that would land outside the root: absolute paths, drive
/// prefixes, and `..` components that climb above the archive's top level.
/// `.` components and backslash separators are normalised away.
pub fn entry_relative_path(file_name: &str) -> Result<PathBuf> {
    if file_name.contains('\0') {
        bail!("entry name {:?} contains a NUL byte", file_name);
    }

    let unified = file_name.replace('\\', "/");
    let mut resolved = PathBuf::new();
    for component in Path::new(&unified).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !resolved.pop() {
                    bail!("entry {:?} escapes the extraction directory", file_name);
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                bail!("entry {:?} has an absolute path", file_name);
            }
        }
    }

    if resolved.as_os_str().is_empty() {
        bail!("entry {:?} has an empty path", file_name);
    }
    Ok(resolved)
}
