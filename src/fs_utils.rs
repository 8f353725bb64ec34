//! Capability-scoped helpers for the small files kept under the data root.

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use std::io;

/// Opens an existing directory.
pub(crate) fn open_dir(path: &Utf8Path) -> io::Result<Dir> {
    Dir::open_ambient_dir(path, ambient_authority())
}

/// Opens a directory, creating it and its parents when missing.
pub(crate) fn ensure_dir(path: &Utf8Path) -> io::Result<Dir> {
    Dir::create_ambient_dir_all(path, ambient_authority())?;
    open_dir(path)
}

/// Reads `file_name` under `dir`.
///
/// A missing directory or file yields `None`.
pub(crate) fn read_optional(dir: &Utf8Path, file_name: &str) -> io::Result<Option<String>> {
    match open_dir(dir).and_then(|handle| handle.read_to_string(file_name)) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

/// Replaces `file_name` under `dir` by writing a sibling temp file and
/// renaming it into place.
pub(crate) fn write_atomic(dir: &Utf8Path, file_name: &str, contents: &str) -> io::Result<()> {
    let handle = ensure_dir(dir)?;
    let temp_name = format!(".{file_name}.tmp");
    handle.write(&temp_name, contents)?;
    handle.rename(&temp_name, &handle, file_name)
}

/// Removes `file_name` under `dir`. A missing file is not an error.
pub(crate) fn remove_optional(dir: &Utf8Path, file_name: &str) -> io::Result<()> {
    match open_dir(dir).and_then(|handle| handle.remove_file(file_name)) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}

/// Lists the stems of regular files under `dir` named `<stem>.<extension>`,
/// sorted. A missing directory lists nothing.
pub(crate) fn list_file_stems(dir: &Utf8Path, extension: &str) -> io::Result<Vec<String>> {
    let handle = match open_dir(dir) {
        Ok(handle) => handle,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err),
    };

    let suffix = format!(".{extension}");
    let mut stems = Vec::new();
    for listed in handle.entries()? {
        let entry = listed?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let Ok(file_name) = entry.file_name() else {
            continue;
        };
        if let Some(stem) = file_name.strip_suffix(&suffix)
            && !stem.is_empty()
            && !stem.starts_with('.')
        {
            stems.push(stem.to_owned());
        }
    }
    stems.sort();
    Ok(stems)
}
