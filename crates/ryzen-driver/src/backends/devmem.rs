//! `/dev/mem` backend
//!
//! SMN registers are reached through the host bridge's PCI config space:
//! the address goes into the index register at 0xB8, the value is then read
//! from or written to the data register at 0xBC. The PM table is read from
//! a mapping of `/dev/mem` at the physical address the SMU reports.
//!
//! Requires root. Kernels built with `CONFIG_STRICT_DEVMEM` also need
//! `iomem=relaxed` on the command line.

use super::physmem::PhysRegion;
use crate::backend::{BackendType, SmuBackend};
use crate::error::{Result, SmuError};
use crate::io::SysfsFile;
use std::path::{Path, PathBuf};

/// Host bridge (bus 0, device 0, function 0).
pub const HOST_BRIDGE: &str = "0000:00:00.0";

/// SMN index register offset in PCI config space.
pub const SMN_INDEX: u64 = 0xB8;
/// SMN data register offset in PCI config space.
pub const SMN_DATA: u64 = 0xBC;

/// Physical memory device.
pub const DEV_MEM: &str = "/dev/mem";

/// PCI config space + /dev/mem backend
#[derive(Debug)]
pub struct DevMemBackend {
    config: SysfsFile,
    mem_path: PathBuf,
    table: Option<PhysRegion>,
}

impl DevMemBackend {
    /// Open the host bridge config space and `/dev/mem`
    ///
    /// # Errors
    ///
    /// Returns error if either cannot be opened.
    pub fn open() -> Result<Self> {
        let config = Path::new("/sys/bus/pci/devices").join(HOST_BRIDGE).join("config");
        Self::with_paths(config, DEV_MEM)
    }

    /// Open with explicit config-space and memory device paths
    ///
    /// # Errors
    ///
    /// Returns error if either path cannot be opened.
    pub fn with_paths(config: impl AsRef<Path>, mem_path: impl AsRef<Path>) -> Result<Self> {
        let config = SysfsFile::open_rw(config.as_ref()).map_err(|e| {
            SmuError::backend_unavailable(format!("PCI config space not writable: {e}"))
        })?;

        let mem_path = mem_path.as_ref().to_path_buf();
        // Fail early rather than on the first table read
        std::fs::File::open(&mem_path).map_err(|e| {
            SmuError::backend_unavailable(format!("Cannot open {}: {e}", mem_path.display()))
        })?;

        tracing::info!("Using PCI config space at {}", config.path().display());

        Ok(Self {
            config,
            mem_path,
            table: None,
        })
    }

    /// Map (or reuse) the table window
    fn table_window(&mut self, addr: u64, len: usize) -> Result<&PhysRegion> {
        let stale = self
            .table
            .as_ref()
            .map_or(true, |t| t.phys_addr() != addr || t.len() < len);
        if stale {
            self.table = None;
            self.table = Some(PhysRegion::map(&self.mem_path, addr, len)?);
        }
        self.table
            .as_ref()
            .ok_or_else(|| SmuError::memory_access("PM table window not mapped"))
    }
}

impl SmuBackend for DevMemBackend {
    fn read_register(&mut self, addr: u32) -> Result<u32> {
        self.config.write_all_at(SMN_INDEX, &(addr & !3).to_le_bytes())?;
        let value = self.config.read_u32_at(SMN_DATA)?;
        tracing::trace!("SMN read {addr:#010x} = {value:#x}");
        Ok(value)
    }

    fn write_register(&mut self, addr: u32, value: u32) -> Result<()> {
        tracing::trace!("SMN write {addr:#010x} = {value:#x}");
        self.config.write_all_at(SMN_INDEX, &addr.to_le_bytes())?;
        self.config.write_all_at(SMN_DATA, &value.to_le_bytes())
    }

    fn copy_table(&mut self, addr: u64, buffer: &mut [u8]) -> Result<()> {
        self.table_window(addr, buffer.len())?.read_bytes(0, buffer)
    }

    fn needs_transfer(&mut self, addr: u64, cached: &[u8]) -> Result<bool> {
        // Unchanged live memory means nobody has transferred since our last copy
        self.table_window(addr, cached.len())?.matches(cached)
    }

    fn reported_table_size(&self) -> Option<usize> {
        None
    }

    fn backend_type(&self) -> BackendType {
        BackendType::DevMem
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fake_config() -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(&[0u8; 256]).unwrap();
        f
    }

    #[test]
    fn register_writes_go_through_index_then_data() {
        let config = fake_config();
        let mem = fake_config();
        let mut backend = DevMemBackend::with_paths(config.path(), mem.path()).unwrap();

        backend.write_register(0x03B1_0A20, 0x65).unwrap();

        let raw = std::fs::read(config.path()).unwrap();
        assert_eq!(&raw[0xB8..0xBC], &0x03B1_0A20u32.to_le_bytes());
        assert_eq!(&raw[0xBC..0xC0], &0x65u32.to_le_bytes());
    }

    #[test]
    fn register_reads_align_the_index() {
        let config = fake_config();
        let mem = fake_config();
        let mut backend = DevMemBackend::with_paths(config.path(), mem.path()).unwrap();

        backend.write_register(0x03B1_0A80, 0x1).unwrap();
        assert_eq!(backend.read_register(0x03B1_0A83).unwrap(), 0x1);

        let raw = std::fs::read(config.path()).unwrap();
        assert_eq!(&raw[0xB8..0xBC], &0x03B1_0A80u32.to_le_bytes());
    }

    #[test]
    fn live_table_comparison() {
        let config = fake_config();
        let mut mem = tempfile::NamedTempFile::new().unwrap();
        let table: Vec<u8> = (0..64u8).collect();
        mem.write_all(&table).unwrap();
        mem.flush().unwrap();
        let mut backend = DevMemBackend::with_paths(config.path(), mem.path()).unwrap();

        let mut copy = vec![0u8; 32];
        backend.copy_table(0, &mut copy).unwrap();
        assert_eq!(copy, &table[..32]);
        assert!(backend.needs_transfer(0, &copy).unwrap());

        copy[0] ^= 0xFF;
        assert!(!backend.needs_transfer(0, &copy).unwrap());
    }

    #[test]
    #[ignore] // Requires root on AMD hardware
    fn test_host_bridge_access() {
        let mut backend = DevMemBackend::open().expect("DevMem backend");
        println!("SMN 0x03B10528 = {:#x}", backend.read_register(0x03B1_0528).unwrap());
    }
}
