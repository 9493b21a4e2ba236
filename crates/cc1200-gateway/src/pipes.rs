//! Creation and removal of the named pipes behind [`PipeSink`](crate::PipeSink)
//! and [`PipeSource`](crate::PipeSource).

use std::{
    fs,
    io::{self, ErrorKind},
    os::unix::fs::FileTypeExt,
    path::{Path, PathBuf},
};

use nix::{sys::stat::Mode, unistd::mkfifo};

use crate::GatewayError;

/// The named pipes this process created.
///
/// Pipes that already existed are used as they are and left in place by
/// [`CreatedPipes::remove()`].
#[derive(Debug, Default)]
pub struct CreatedPipes {
    paths: Vec<PathBuf>,
}

impl CreatedPipes {
    /// Make sure a named pipe exists at every one of `paths`.
    ///
    /// Fails if a path exists but is not a named pipe.
    pub fn create<P: AsRef<Path>>(paths: &[P]) -> Result<Self, GatewayError> {
        let mut created = Self::default();
        for path in paths {
            let path = path.as_ref();
            match fs::metadata(path) {
                Ok(meta) if meta.file_type().is_fifo() => {
                    log::debug!("Using existing pipe {}", path.display());
                }
                Ok(_) => {
                    created.remove();
                    return Err(io::Error::new(
                        ErrorKind::AlreadyExists,
                        format!("{} is not a named pipe", path.display()),
                    )
                    .into());
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    let mode = Mode::S_IRUSR
                        | Mode::S_IWUSR
                        | Mode::S_IRGRP
                        | Mode::S_IWGRP
                        | Mode::S_IROTH
                        | Mode::S_IWOTH;
                    if let Err(e) = mkfifo(path, mode) {
                        created.remove();
                        return Err(io::Error::from(e).into());
                    }
                    log::info!("Created pipe {}", path.display());
                    created.paths.push(path.to_path_buf());
                }
                Err(e) => {
                    created.remove();
                    return Err(e.into());
                }
            }
        }
        Ok(created)
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Unlink every pipe this process created.
    pub fn remove(&self) {
        for path in &self.paths {
            match fs::remove_file(path) {
                Ok(()) => log::debug!("Removed pipe {}", path.display()),
                Err(e) if e.kind() == ErrorKind::NotFound => (),
                Err(e) => log::warn!("Could not remove {}: {e}", path.display()),
            }
        }
    }
}
