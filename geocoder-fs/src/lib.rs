//! Capability-based filesystem helpers for the postcode geocoder.
//!
//! Every helper resolves an ambient base directory through `cap-std` and
//! operates relative to it, so callers never touch `std::fs` directly.
#![forbid(unsafe_code)]

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::fs::OpenOptions;
use cap_std::{ambient_authority, fs_utf8};
use std::io;
use std::path::Component;
use std::time::{SystemTime, UNIX_EPOCH};

/// What a filesystem path currently refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// A regular file.
    File,
    /// A directory.
    Directory,
    /// Anything else (sockets, devices, dangling links).
    Other,
}

/// Open a UTF-8 file path for reading using ambient authority.
pub fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Resolve the ambient parent directory of `path` and return it with the file name.
pub fn open_dir_and_file(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other("path should include a file name"))?
        .to_owned();
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}

/// Inspect `path`, returning `None` when nothing exists there.
pub fn path_kind(path: &Utf8Path) -> io::Result<Option<PathKind>> {
    let metadata = if path.file_name().is_none() {
        fs_utf8::Dir::open_ambient_dir(path, ambient_authority())
            .and_then(|dir| dir.dir_metadata())
    } else {
        open_dir_and_file(path).and_then(|(dir, name)| dir.metadata(name.as_str()))
    };
    match metadata {
        Ok(meta) if meta.is_file() => Ok(Some(PathKind::File)),
        Ok(meta) if meta.is_dir() => Ok(Some(PathKind::Directory)),
        Ok(_) => Ok(Some(PathKind::Other)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

/// Return whether a path exists and is a regular file.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    path_kind(path).map(|kind| kind == Some(PathKind::File))
}

/// Return whether the current process can create files in the directory at `path`.
///
/// Permission bits alone cannot answer this (ownership, ACLs and read-only
/// mounts all matter), so the check creates and removes a uniquely named
/// scratch file inside the directory.
pub fn dir_is_writable(path: &Utf8Path) -> io::Result<bool> {
    let dir = fs_utf8::Dir::open_ambient_dir(path, ambient_authority())?;
    let scratch = scratch_file_name();
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    match dir.open_with(&scratch, &options) {
        Ok(file) => {
            drop(file);
            dir.remove_file(&scratch)?;
            Ok(true)
        }
        Err(err)
            if matches!(
                err.kind(),
                io::ErrorKind::PermissionDenied | io::ErrorKind::ReadOnlyFilesystem
            ) =>
        {
            Ok(false)
        }
        Err(err) => Err(err),
    }
}

fn scratch_file_name() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.subsec_nanos());
    format!(".postcodes-write-check-{}-{nanos}", std::process::id())
}

/// Create `path` and any missing parents.
pub fn create_dir_all(path: &Utf8Path) -> io::Result<()> {
    let (base_dir, relative) = base_dir_and_relative(path)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    base_dir.create_dir_all(&relative)
}

/// Split an absolute or relative path into an ambient base directory and a relative suffix.
pub fn base_dir_and_relative(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let std_path = path.as_std_path();

    let (base, relative) = match std_path.components().next() {
        // Windows absolute path with a drive or UNC prefix.
        Some(Component::Prefix(prefix)) => {
            let prefix_str = prefix
                .as_os_str()
                .to_str()
                .ok_or_else(|| io::Error::other("non-UTF-8 path prefix"))?;
            let base = Utf8PathBuf::from(prefix_str).join(std::path::MAIN_SEPARATOR_STR);
            let relative = std_path
                .strip_prefix(base.as_std_path())
                .map_err(|_| io::Error::other("failed to strip prefix from path"))?
                .to_path_buf();
            (base, relative)
        }
        Some(Component::RootDir) => {
            let base = Utf8PathBuf::from(std::path::MAIN_SEPARATOR_STR);
            let relative = std_path
                .strip_prefix(base.as_std_path())
                .map_err(|_| io::Error::other("failed to strip root from absolute path"))?
                .to_path_buf();
            (base, relative)
        }
        _ => (Utf8PathBuf::from("."), std_path.to_path_buf()),
    };

    let dir = fs_utf8::Dir::open_ambient_dir(&base, ambient_authority())?;
    let relative =
        Utf8PathBuf::from_path_buf(relative).map_err(|_| io::Error::other("non-UTF-8 path"))?;

    Ok((dir, relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn temp_dir() -> TempDir {
        TempDir::new().expect("create temp dir")
    }

    fn utf8(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 path")
    }

    #[rstest]
    fn reports_missing_paths(temp_dir: TempDir) {
        let path = utf8(&temp_dir).join("absent.csv");
        assert_eq!(path_kind(&path).expect("inspect path"), None);
        assert!(!file_is_file(&path).expect("inspect path"));
    }

    #[rstest]
    fn distinguishes_files_and_directories(temp_dir: TempDir) {
        let root = utf8(&temp_dir);
        let file = root.join("postcodes.csv");
        std::fs::write(file.as_std_path(), b"pcds,lat,long\n").expect("write file");

        assert_eq!(path_kind(&file).expect("inspect"), Some(PathKind::File));
        assert_eq!(path_kind(&root).expect("inspect"), Some(PathKind::Directory));
    }

    #[rstest]
    fn creates_nested_directories(temp_dir: TempDir) {
        let nested = utf8(&temp_dir).join("a/b/c");
        create_dir_all(&nested).expect("create nested directories");
        assert_eq!(
            path_kind(&nested).expect("inspect"),
            Some(PathKind::Directory)
        );
    }

    #[rstest]
    fn fresh_temp_dir_is_writable(temp_dir: TempDir) {
        assert!(dir_is_writable(&utf8(&temp_dir)).expect("inspect permissions"));
    }

    #[rstest]
    fn writability_check_leaves_no_files_behind(temp_dir: TempDir) {
        dir_is_writable(&utf8(&temp_dir)).expect("inspect permissions");
        let leftovers = std::fs::read_dir(temp_dir.path())
            .expect("list directory")
            .count();
        assert_eq!(leftovers, 0);
    }

    #[cfg(unix)]
    #[rstest]
    fn read_only_dir_is_not_writable(temp_dir: TempDir) {
        use std::os::unix::fs::PermissionsExt;

        let locked = temp_dir.path().join("locked");
        std::fs::create_dir(&locked).expect("create directory");
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o555))
            .expect("drop write permission");
        // Privileged users bypass permission bits entirely.
        let bypassed = std::fs::write(locked.join("canary"), b"").is_ok();

        let writable = dir_is_writable(&utf8(&temp_dir).join("locked")).expect("inspect");
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755))
            .expect("restore write permission");
        assert_eq!(writable, bypassed);
    }

    #[rstest]
    fn opens_files_for_reading(temp_dir: TempDir) {
        use std::io::Read;

        let file = utf8(&temp_dir).join("data.csv");
        std::fs::write(file.as_std_path(), b"header\n").expect("write file");
        let mut contents = String::new();
        open_utf8_file(&file)
            .expect("open file")
            .read_to_string(&mut contents)
            .expect("read file");
        assert_eq!(contents, "header\n");
    }
}
