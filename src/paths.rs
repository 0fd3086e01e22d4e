//! Where client configuration lives on disk.
//!
//! | Path | Unix | Windows |
//! |------|------|---------|
//! | config file | `~/.ctlplaneconfig` | `%LOCALAPPDATA%\ctlplane.config` |
//! | config dir | `~/.ctlplane.d` | `%LOCALAPPDATA%\ctlplane.d` |
//! | tmp dir | `$CTLPLANE_TMP_DIR` or `<config dir>/tmp` | same |

use crate::core::error::{ControlPlaneError, Result};
use std::path::{Path, PathBuf};

/// Overrides the temporary directory; used as-is and never created.
pub const TMP_DIR_ENV: &str = "CTLPLANE_TMP_DIR";

#[cfg(not(windows))]
fn base_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| ControlPlaneError::Config("Could not find home directory".into()))
}

#[cfg(windows)]
fn base_dir() -> Result<PathBuf> {
    dirs::data_local_dir()
        .ok_or_else(|| ControlPlaneError::Config("Could not find local app data directory".into()))
}

pub fn config_file() -> Result<PathBuf> {
    let name = if cfg!(windows) { "ctlplane.config" } else { ".ctlplaneconfig" };
    Ok(base_dir()?.join(name))
}

pub fn config_dir() -> Result<PathBuf> {
    let name = if cfg!(windows) { "ctlplane.d" } else { ".ctlplane.d" };
    Ok(base_dir()?.join(name))
}

/// Scratch directory for the client.
///
/// Honors [`TMP_DIR_ENV`]; otherwise `<config dir>/tmp`, created on first use.
/// The override wins even when the config directory cannot be resolved.
pub fn config_tmp_dir() -> Result<PathBuf> {
    let overridden = std::env::var_os(TMP_DIR_ENV).map(PathBuf::from);
    resolve_tmp_dir(overridden.as_deref(), config_dir)
}

fn resolve_tmp_dir<F>(overridden: Option<&Path>, config_dir: F) -> Result<PathBuf>
where
    F: FnOnce() -> Result<PathBuf>,
{
    if let Some(dir) = overridden.filter(|d| !d.as_os_str().is_empty()) {
        return Ok(std::path::absolute(dir)?);
    }

    let tmp = config_dir()?.join("tmp");
    if !tmp.try_exists()? {
        std::fs::create_dir_all(&tmp)?;
        tracing::debug!(path = %tmp.display(), "created tmp directory");
    }
    Ok(tmp)
}
