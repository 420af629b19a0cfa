//! ryzen_smu kernel module backend
//!
//! The module exposes the SMN bus and the PM table as sysfs attributes:
//!
//! ```text
//! /sys/kernel/ryzen_smu_drv/
//!   drv_version     "0.1.7"
//!   smn             write [addr] then read [value]; write [addr, value] to store
//!   pm_table        raw table bytes, refreshed by the module on every read
//!   pm_table_size   little-endian size, low 32 bits used
//! ```
//!
//! Any 0.x release is accepted. Missing `pm_table` nodes only fail on the first
//! table copy, so SMN-only drivers can still adjust limits.

use crate::backend::{BackendType, SmuBackend};
use crate::error::{Result, SmuError};
use crate::io::SysfsFile;
use std::path::{Path, PathBuf};

/// Releases before this one are accepted with a warning.
pub const RECOMMENDED_DRIVER: (u32, u32, u32) = (0, 1, 7);

/// ryzen_smu sysfs backend
#[derive(Debug)]
pub struct KernelModuleBackend {
    root: PathBuf,
    smn: SysfsFile,
    pm_table: Option<SysfsFile>,
    pm_table_size: Option<usize>,
    version: (u32, u32, u32),
}

impl KernelModuleBackend {
    /// Open the driver rooted at `root`
    ///
    /// # Errors
    ///
    /// Returns error if the driver is not loaded, not a 0.x release, or its
    /// `smn` node cannot be opened.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        tracing::debug!("Probing ryzen_smu at {}", root.display());

        let raw = SysfsFile::read_to_string(root.join("drv_version"))
            .map_err(|e| SmuError::backend_unavailable(format!("ryzen_smu not loaded: {e}")))?;
        let version = parse_driver_version(&raw)
            .ok_or_else(|| SmuError::driver_version(root, format!("unparseable version {raw:?}")))?;
        check_driver_version(version).map_err(|reason| SmuError::driver_version(root, reason))?;

        let smn = SysfsFile::open_rw(root.join("smn"))?;

        // Older firmware interfaces have no PM table; register access still works
        let pm_table = SysfsFile::open_read(root.join("pm_table")).ok();
        let pm_table_size = match SysfsFile::open_read(root.join("pm_table_size")) {
            Ok(f) => usize::try_from(f.read_u32_at(0)?).ok(),
            Err(_) => None,
        };

        tracing::info!(
            "ryzen_smu {}.{}.{} at {} (pm_table: {})",
            version.0,
            version.1,
            version.2,
            root.display(),
            pm_table_size.map_or_else(|| "absent".to_string(), |s| format!("{s:#x} bytes"))
        );

        Ok(Self {
            root: root.to_path_buf(),
            smn,
            pm_table,
            pm_table_size,
            version,
        })
    }

    /// Driver version as `(major, minor, patch)`
    pub const fn driver_version(&self) -> (u32, u32, u32) {
        self.version
    }

    /// sysfs root
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SmuBackend for KernelModuleBackend {
    fn read_register(&mut self, addr: u32) -> Result<u32> {
        self.smn.write_all_at(0, &addr.to_le_bytes())?;
        let value = self.smn.read_u32_at(0)?;
        tracing::trace!("SMN read {addr:#010x} = {value:#x}");
        Ok(value)
    }

    fn write_register(&mut self, addr: u32, value: u32) -> Result<()> {
        tracing::trace!("SMN write {addr:#010x} = {value:#x}");
        let mut pair = [0u8; 8];
        pair[..4].copy_from_slice(&addr.to_le_bytes());
        pair[4..].copy_from_slice(&value.to_le_bytes());
        self.smn.write_all_at(0, &pair)
    }

    fn copy_table(&mut self, _addr: u64, buffer: &mut [u8]) -> Result<()> {
        let table = self
            .pm_table
            .as_ref()
            .ok_or_else(|| SmuError::memory_access("ryzen_smu exposes no pm_table"))?;

        if let Some(size) = self.pm_table_size {
            if size != buffer.len() {
                return Err(SmuError::memory_access(format!(
                    "pm_table size mismatch: driver reports {size:#x}, expected {:#x}",
                    buffer.len()
                )));
            }
        }

        table.read_exact_at(0, buffer)
    }

    fn needs_transfer(&mut self, _addr: u64, _cached: &[u8]) -> Result<bool> {
        // The module reads the table fresh every time; there is nothing to compare
        Ok(true)
    }

    fn reported_table_size(&self) -> Option<usize> {
        self.pm_table_size
    }

    fn backend_type(&self) -> BackendType {
        BackendType::KernelModule
    }
}

/// Parse `major.minor.patch` from the `drv_version` attribute
pub fn parse_driver_version(raw: &str) -> Option<(u32, u32, u32)> {
    let mut parts = raw.trim().splitn(3, '.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    let patch = parts
        .next()?
        .split(|c: char| !c.is_ascii_digit())
        .next()?
        .parse()
        .ok()?;
    Some((major, minor, patch))
}

fn check_driver_version(version: (u32, u32, u32)) -> std::result::Result<(), String> {
    let (major, minor, patch) = version;
    if major != 0 {
        return Err(format!("incompatible major version {major}.{minor}.{patch}"));
    }
    if version < RECOMMENDED_DRIVER {
        let (rm, rn, rp) = RECOMMENDED_DRIVER;
        tracing::warn!("ryzen_smu {major}.{minor}.{patch} is older than {rm}.{rn}.{rp}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_parsing() {
        assert_eq!(parse_driver_version("0.1.7\n"), Some((0, 1, 7)));
        assert_eq!(parse_driver_version("0.1.10-dkms"), Some((0, 1, 10)));
        assert_eq!(parse_driver_version("garbage"), None);
    }

    #[test]
    fn version_gate() {
        assert!(check_driver_version((0, 1, 7)).is_ok());
        assert!(check_driver_version((0, 1, 12)).is_ok());
        assert!(check_driver_version((0, 1, 5)).is_ok());
        assert!(check_driver_version((0, 2, 0)).is_ok());
        assert!(check_driver_version((1, 0, 0)).is_err());
        assert!(check_driver_version((1, 1, 7)).is_err());
    }

    #[test]
    fn missing_driver_is_backend_unavailable() {
        let err = KernelModuleBackend::open("/nonexistent/ryzen_smu_drv").unwrap_err();
        assert!(matches!(err, SmuError::BackendUnavailable { .. }));
    }
}
