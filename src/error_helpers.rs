//! Error helper functions for creating actionable error messages

use anyhow::anyhow;
use std::io;
use std::path::Path;

/// Check if an IO error is a permission denied error
pub fn is_permission_denied(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::PermissionDenied
}

/// Check if an IO error is a "not found" error
pub fn is_not_found(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::NotFound
}

/// Create an enhanced error message for file permission issues
pub fn permission_error(path: &Path, operation: &str) -> String {
    let parent_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| ".".to_string());

    format!(
        "Permission denied when {} '{}'\n\n\
         Possible fixes:\n\
         1. Check file permissions: ls -l '{}'\n\
         2. Ensure write access to the file and its directory: chmod u+w '{}'\n\
         3. For backup operations: Use --backup-dir to pick a writable location",
        operation,
        path.display(),
        path.display(),
        parent_dir
    )
}

/// Create an enhanced error message for a missing page
pub fn not_found_error(path: &Path, context: &str) -> String {
    format!(
        "File not found: '{}'\n\n\
         Context: {}\n\n\
         Possible fixes:\n\
         1. Run catpatch from the web project's root directory\n\
         2. Pass the page explicitly: catpatch path/to/Home.jsx\n\
         3. Set [patch] target in the config file (catpatch config)",
        path.display(),
        context
    )
}

/// Create an enhanced error message for directory creation failures
pub fn dir_create_error(path: &Path, underlying_err: &io::Error) -> String {
    let base = format!("Failed to create directory: '{}'", path.display());
    let parent = path
        .parent()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| ".".to_string());

    if is_permission_denied(underlying_err) {
        format!(
            "{}\n\n\
             Cause: Permission denied\n\n\
             Possible fixes:\n\
             1. Check write permissions on '{}'\n\
             2. Try creating it manually: mkdir -p '{}'\n\
             3. Use --backup-dir to specify a different location",
            base,
            parent,
            path.display()
        )
    } else {
        format!("{}\n\nUnderlying error: {}", base, underlying_err)
    }
}

/// Turn a failed read of the page into an actionable error
pub fn read_error(path: &Path, err: io::Error) -> anyhow::Error {
    if is_not_found(&err) {
        anyhow!(not_found_error(path, "reading the page to patch"))
    } else if is_permission_denied(&err) {
        anyhow!(permission_error(path, "reading"))
    } else if err.kind() == io::ErrorKind::InvalidData {
        anyhow!("'{}' is not valid UTF-8 text", path.display())
    } else {
        anyhow::Error::new(err).context(format!("Failed to read file: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;

    #[test]
    fn test_is_permission_denied() {
        let perm_err = io::Error::new(ErrorKind::PermissionDenied, "access denied");
        assert!(is_permission_denied(&perm_err));

        let not_found_err = io::Error::new(ErrorKind::NotFound, "not found");
        assert!(!is_permission_denied(&not_found_err));
    }

    #[test]
    fn test_is_not_found() {
        let not_found_err = io::Error::new(ErrorKind::NotFound, "not found");
        assert!(is_not_found(&not_found_err));

        let perm_err = io::Error::new(ErrorKind::PermissionDenied, "access denied");
        assert!(!is_not_found(&perm_err));
    }

    #[test]
    fn test_permission_error_formatting() {
        let msg = permission_error(Path::new("Home.jsx"), "writing");
        assert!(msg.contains("Permission denied when writing 'Home.jsx'"));
        assert!(msg.contains("chmod u+w '.'"));
        assert!(msg.contains("Possible fixes"));
    }

    #[test]
    fn test_not_found_error_formatting() {
        let path = Path::new("src/pages/Home.jsx");
        let msg = not_found_error(path, "reading the page to patch");
        assert!(msg.contains("File not found: 'src/pages/Home.jsx'"));
        assert!(msg.contains("reading the page to patch"));
        assert!(msg.contains("Possible fixes"));
    }

    #[test]
    fn test_dir_create_error_permission() {
        let err = io::Error::new(ErrorKind::PermissionDenied, "denied");
        let msg = dir_create_error(Path::new("/root/backups"), &err);
        assert!(msg.contains("Cause: Permission denied"));
        assert!(msg.contains("mkdir -p '/root/backups'"));
    }

    #[test]
    fn test_read_error_maps_kinds() {
        let path = Path::new("missing.jsx");
        let err = read_error(path, io::Error::new(ErrorKind::NotFound, "gone"));
        assert!(err.to_string().starts_with("File not found"));

        let err = read_error(path, io::Error::new(ErrorKind::InvalidData, "bad utf-8"));
        assert!(err.to_string().contains("not valid UTF-8"));
    }
}
