use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use tempfile::Builder;

use crate::error::{ConvertError, ConvertResult};

/// Opens `path` for reading, reporting a missing file as [`ConvertError::SourceNotFound`].
pub fn open_source(path: &Path) -> ConvertResult<BufReader<File>> {
    match File::open(path) {
        Ok(file) => Ok(BufReader::new(file)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            Err(ConvertError::SourceNotFound(path.to_path_buf()))
        }
        Err(err) => Err(err.into()),
    }
}

/// Replaces `path` with `content` through a temporary file in the same directory.
pub fn write_atomic(path: &Path, content: &str) -> ConvertResult<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut tmp = Builder::new().prefix(".p2j").tempfile_in(&parent)?;
    tmp.as_file_mut().write_all(content.as_bytes())?;
    tmp.as_file_mut().sync_all()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(metadata) = fs::metadata(path) {
            let mode = metadata.permissions().mode();
            let _ = fs::set_permissions(tmp.path(), fs::Permissions::from_mode(mode));
        }
    }

    tmp.persist(path).map_err(|err| ConvertError::Io(err.error))?;
    Ok(())
}

/// Appends `content` to `path`, creating the file when missing.
pub fn append(path: &Path, content: &str) -> ConvertResult<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(content.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn write_atomic_replaces_content() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("nb.ipynb");
        fs::write(&file_path, "old").unwrap();

        write_atomic(&file_path, "new").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "new");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn write_atomic_creates_missing_target() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("fresh.ipynb");

        write_atomic(&file_path, "{}").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "{}");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn append_keeps_existing_content() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("script.py");
        fs::write(&file_path, "a = 1\n").unwrap();

        append(&file_path, "b = 2").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "a = 1\nb = 2");
    }

    #[test]
    fn missing_source_is_reported() {
        let dir = tempdir().unwrap();
        let err = open_source(&dir.path().join("missing.py")).unwrap_err();
        assert!(matches!(err, ConvertError::SourceNotFound(_)));
    }
}
