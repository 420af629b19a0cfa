//! Positioned I/O on sysfs attribute files
//!
//! Both the ryzen_smu driver nodes and PCI `config` files are accessed with
//! pread/pwrite at explicit offsets, never through the shared file cursor.

use crate::error::{Result, SmuError};
use rustix::io::{pread, pwrite};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// An open sysfs attribute
#[derive(Debug)]
pub struct SysfsFile {
    file: File,
    path: PathBuf,
}

impl SysfsFile {
    /// Open read-only
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be opened.
    pub fn open_read(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path.as_ref(), OpenOptions::new().read(true))
    }

    /// Open read-write
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be opened.
    pub fn open_rw(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path.as_ref(), OpenOptions::new().read(true).write(true))
    }

    fn open_with(path: &Path, options: &OpenOptions) -> Result<Self> {
        let file = options.open(path).map_err(|e| {
            SmuError::memory_access(format!("Cannot open {}: {e}", path.display()))
        })?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Fill `buffer` from `offset`
    ///
    /// # Errors
    ///
    /// Returns error on I/O failure or short read.
    pub fn read_exact_at(&self, offset: u64, buffer: &mut [u8]) -> Result<()> {
        let mut done = 0;
        while done < buffer.len() {
            let n = pread(&self.file, &mut buffer[done..], offset + done as u64).map_err(|e| {
                SmuError::memory_access(format!("Read {} failed: {e}", self.path.display()))
            })?;
            if n == 0 {
                return Err(SmuError::memory_access(format!(
                    "Short read from {}: {done} of {} bytes",
                    self.path.display(),
                    buffer.len()
                )));
            }
            done += n;
        }
        Ok(())
    }

    /// Write all of `data` at `offset`
    ///
    /// # Errors
    ///
    /// Returns error on I/O failure or short write.
    pub fn write_all_at(&self, offset: u64, data: &[u8]) -> Result<()> {
        let n = pwrite(&self.file, data, offset).map_err(|e| {
            SmuError::memory_access(format!("Write {} failed: {e}", self.path.display()))
        })?;
        // sysfs stores take the whole buffer in one call or nothing
        if n != data.len() {
            return Err(SmuError::memory_access(format!(
                "Short write to {}: {n} of {} bytes",
                self.path.display(),
                data.len()
            )));
        }
        Ok(())
    }

    /// Read a little-endian u32 at `offset`
    ///
    /// # Errors
    ///
    /// Returns error on I/O failure or short read.
    pub fn read_u32_at(&self, offset: u64) -> Result<u32> {
        let mut word = [0u8; 4];
        self.read_exact_at(offset, &mut word)?;
        Ok(u32::from_le_bytes(word))
    }

    /// Whole file as a string (for text attributes such as `drv_version`)
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read.
    pub fn read_to_string(path: impl AsRef<Path>) -> Result<String> {
        let path = path.as_ref();
        std::fs::read_to_string(path)
            .map_err(|e| SmuError::memory_access(format!("Cannot read {}: {e}", path.display())))
    }

    /// Path this file was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }
}
