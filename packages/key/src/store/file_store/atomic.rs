//! All-or-nothing file replacement with owner-only permissions

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use tracing::debug;

/// Replace `target` with `contents`.
///
/// The bytes go to a temporary file in the same directory, are synced, and
/// the file is renamed over `target`, so readers see either the old or the
/// new document and never a prefix.
pub(super) fn write_atomic(directory: &Path, target: &Path, contents: &[u8]) -> io::Result<()> {
    let mut temp = tempfile::Builder::new()
        .prefix(".keyrotor-")
        .suffix(".tmp")
        .tempfile_in(directory)?;

    restrict_file(temp.as_file());
    temp.write_all(contents)?;
    temp.as_file().sync_all()?;
    temp.persist(target).map_err(|e| e.error)?;

    sync_directory(directory);
    Ok(())
}

#[cfg(unix)]
fn restrict_file(file: &File) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = file.set_permissions(std::fs::Permissions::from_mode(0o600)) {
        debug!(error = %e, "Cannot restrict key file permissions");
    }
}

#[cfg(not(unix))]
fn restrict_file(_file: &File) {
    debug!("Cannot set owner-only permissions on this platform");
}

/// Best effort: owner-only access to a freshly created key directory.
#[cfg(unix)]
pub(super) fn restrict_directory(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700)) {
        debug!(path = %path.display(), error = %e, "Cannot restrict key directory permissions");
    }
}

#[cfg(not(unix))]
pub(super) fn restrict_directory(_path: &Path) {}

// Makes the rename itself durable
#[cfg(unix)]
fn sync_directory(directory: &Path) {
    if let Err(e) = File::open(directory).and_then(|dir| dir.sync_all()) {
        debug!(path = %directory.display(), error = %e, "Directory sync failed");
    }
}

#[cfg(not(unix))]
fn sync_directory(_directory: &Path) {}
