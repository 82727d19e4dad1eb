//! Helpers for preparing ORCA jobs on a SLURM cluster and summarizing the
//! results.

use std::path::{Path, PathBuf};

pub mod config;
pub mod geom;
pub mod greet;
pub mod input;
pub mod launch;
pub mod memory;
pub mod output;
pub mod queue;
pub mod summary;


/// version stamped into every generated file
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// return the sorted paths of the regular files in `dir` with extension `ext`
pub fn files_with_ext(
    dir: impl AsRef<Path>,
    ext: &str,
) -> std::io::Result<Vec<PathBuf>> {
    let mut ret = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_file()
            && path.extension().is_some_and(|e| e == ext)
        {
            ret.push(path);
        }
    }
    ret.sort();
    Ok(ret)
}

/// the base name of `dir`, after resolving `.` and friends. used as the job
/// name for generated files
pub fn job_name(dir: impl AsRef<Path>) -> std::io::Result<String> {
    let dir = std::fs::canonicalize(dir)?;
    Ok(dir
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("root")))
}

/// write `contents` to `path` and mark it executable on unix
pub fn write_script(
    path: impl AsRef<Path>,
    contents: &str,
) -> std::io::Result<()> {
    let path = path.as_ref();
    std::fs::write(path, contents)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(path)?.permissions();
        perms.set_mode(perms.mode() | 0o111);
        std::fs::set_permissions(path, perms)?;
    }
    Ok(())
}
