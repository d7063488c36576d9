//! Data-file storage.

use crate::backend::{checked_range, StorageBackend};
use crate::error::{StorageError, StorageResult};
use fs2::FileExt;
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// A log medium backed by a single data file.
///
/// The file is opened in append mode, so every write lands at the end
/// whatever the read position. It stays under an exclusive advisory lock
/// until the backend is dropped; a second server pointed at the same path
/// fails with [`StorageError::Locked`] instead of interleaving writes.
///
/// ```no_run
/// use ringlog_storage::{FileBackend, StorageBackend};
/// use std::path::Path;
///
/// let mut backend = FileBackend::open(Path::new("/var/tmp/ringlog.data")).unwrap();
/// backend.append(b"record\n").unwrap();
/// backend.sync().unwrap();
/// ```
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    // Reads seek, so they need exclusive access to the handle.
    file: Mutex<File>,
    len: u64,
}

impl FileBackend {
    /// Opens the data file at `path`, creating it if missing.
    ///
    /// Existing content is kept and becomes the start of the log.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Locked`] if another handle holds the lock,
    /// or an I/O error if the file cannot be opened.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)?;

        file.try_lock_exclusive().map_err(|e| lock_error(path, e))?;

        let len = file.metadata()?.len();
        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
            len,
        })
    }

    /// Like [`open`](Self::open), creating missing parent directories first.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be created or the file cannot
    /// be opened.
    pub fn open_with_create_dirs(path: &Path) -> StorageResult<Self> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)?,
            _ => {}
        }
        Self::open(path)
    }

    /// Path of the data file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Only a contended lock means another owner; anything else is an I/O fault.
fn lock_error(path: &Path, err: io::Error) -> StorageError {
    let contended = err.kind() == io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error();
    if contended {
        StorageError::Locked {
            path: path.to_path_buf(),
        }
    } else {
        StorageError::Io(err)
    }
}

impl StorageBackend for FileBackend {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        checked_range(offset, len, self.len)?;
        let mut buf = vec![0u8; len];
        if len > 0 {
            let mut file = self.file.lock();
            file.seek(SeekFrom::Start(offset))?;
            file.read_exact(&mut buf)?;
        }
        Ok(buf)
    }

    fn append(&mut self, data: &[u8]) -> StorageResult<u64> {
        let at = self.len;
        if !data.is_empty() {
            self.file.get_mut().write_all(data)?;
            self.len += data.len() as u64;
        }
        Ok(at)
    }

    fn flush(&mut self) -> StorageResult<()> {
        self.file.get_mut().flush()?;
        Ok(())
    }

    fn size(&self) -> StorageResult<u64> {
        Ok(self.len)
    }

    fn sync(&mut self) -> StorageResult<()> {
        self.file.get_mut().sync_data()?;
        Ok(())
    }

    fn copy_range(&self, offset: u64, out: &mut dyn Write) -> StorageResult<u64> {
        if offset >= self.len {
            return Ok(0);
        }
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset))?;
        let copied = io::copy(&mut (&mut *file).take(self.len - offset), out)?;
        Ok(copied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn open_creates_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ringlog.data");

        let backend = FileBackend::open(&path).unwrap();
        assert_eq!(backend.size().unwrap(), 0);
        assert!(path.exists());
        assert_eq!(backend.path(), path);
    }

    #[test]
    fn records_read_back() {
        let dir = tempdir().unwrap();
        let mut backend = FileBackend::open(&dir.path().join("ringlog.data")).unwrap();

        assert_eq!(backend.append(b"one\n").unwrap(), 0);
        assert_eq!(backend.append(b"two\n").unwrap(), 4);
        assert_eq!(backend.append(b"").unwrap(), 8);

        assert_eq!(backend.read_at(4, 4).unwrap(), b"two\n");
        assert!(matches!(
            backend.read_at(6, 4),
            Err(StorageError::ReadPastEnd { size: 8, .. })
        ));
    }

    #[test]
    fn appends_go_to_end_after_reads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ringlog.data");
        let mut backend = FileBackend::open(&path).unwrap();

        backend.append(b"first\n").unwrap();
        backend.read_at(0, 2).unwrap();
        backend.append(b"second\n").unwrap();
        backend.flush().unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"first\nsecond\n");
    }

    #[test]
    fn copy_range_streams_from_offset() {
        let dir = tempdir().unwrap();
        let mut backend = FileBackend::open(&dir.path().join("ringlog.data")).unwrap();
        backend.append(b"a\nbb\nccc\n").unwrap();

        let mut out = Vec::new();
        assert_eq!(backend.copy_range(2, &mut out).unwrap(), 7);
        assert_eq!(out, b"bb\nccc\n");
        assert_eq!(backend.copy_range(9, &mut out).unwrap(), 0);
    }

    #[test]
    fn existing_content_is_kept() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ringlog.data");
        fs::write(&path, b"old\n").unwrap();

        let mut backend = FileBackend::open(&path).unwrap();
        assert_eq!(backend.append(b"new\n").unwrap(), 4);
        backend.sync().unwrap();
        drop(backend);

        let backend = FileBackend::open(&path).unwrap();
        assert_eq!(backend.read_at(0, 8).unwrap(), b"old\nnew\n");
    }

    #[test]
    fn second_open_is_locked() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ringlog.data");

        let first = FileBackend::open(&path).unwrap();
        assert!(matches!(
            FileBackend::open(&path),
            Err(StorageError::Locked { .. })
        ));

        drop(first);
        assert!(FileBackend::open(&path).is_ok());
    }

    #[test]
    fn parent_dirs_are_created() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("ringlog.data");

        let mut backend = FileBackend::open_with_create_dirs(&path).unwrap();
        backend.append(b"nested\n").unwrap();
        assert_eq!(backend.size().unwrap(), 7);
        assert!(path.exists());
    }

    #[test]
    fn only_contention_maps_to_locked() {
        let path = Path::new("ringlog.data");

        let contended = lock_error(path, fs2::lock_contended_error());
        assert!(matches!(contended, StorageError::Locked { .. }));

        let unsupported = lock_error(path, io::Error::from(io::ErrorKind::Unsupported));
        assert!(matches!(unsupported, StorageError::Io(_)));
    }
}
