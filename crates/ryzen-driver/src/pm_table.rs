//! PM table transfer and caching
//!
//! ```text
//! init_table:    PSMU version ─► PSMU address ─► allocate ─► refresh_table
//! refresh_table: [transfer (retried)] ─► copy ─► [stale check] ─► commit
//! ```
//!
//! Every refresh copies into a scratch buffer and only replaces the cached
//! table once the copy succeeded, so a failed refresh keeps the last good
//! snapshot.

use crate::error::{Result, SmuError};
use crate::mailbox::Request;
use crate::session::Session;
use ryzen_chip::pm_table::{self, FALLBACK_TABLE_SIZE};
use ryzen_chip::smu::{self, TableMessages};
use ryzen_chip::{EndpointKind, Status};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Cached copy of the SMU telemetry table
#[derive(Debug, Clone, PartialEq)]
pub struct PmTable {
    version: u32,
    size: usize,
    address: u64,
    // f32 storage keeps the byte view 4-aligned for bytemuck
    buffer: Vec<f32>,
    populated: bool,
}

impl PmTable {
    fn new(version: u32, size: usize, address: u64) -> Self {
        Self {
            version,
            size,
            address,
            buffer: vec![0.0; size.div_ceil(4)],
            populated: false,
        }
    }

    /// Table version reported by the SMU
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// Size in bytes
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Physical address the SMU publishes the table at
    pub const fn address(&self) -> u64 {
        self.address
    }

    /// `true` once a transfer and copy have succeeded
    pub const fn is_populated(&self) -> bool {
        self.populated
    }

    /// Raw table contents
    pub fn as_bytes(&self) -> &[u8] {
        &bytemuck::cast_slice::<f32, u8>(&self.buffer)[..self.size]
    }

    fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut bytemuck::cast_slice_mut::<f32, u8>(&mut self.buffer)[..self.size]
    }

    /// Every slot as `f32`
    pub fn values(&self) -> &[f32] {
        &self.buffer[..self.size / 4]
    }

    /// The `f32` at byte `offset`; NaN when unpopulated, misaligned or out of range.
    pub fn read_f32(&self, offset: usize) -> f32 {
        if !self.populated || offset % 4 != 0 || offset + 4 > self.size {
            return f32::NAN;
        }
        self.buffer[offset / 4]
    }

    fn blank(&self) -> Self {
        Self::new(self.version, self.size, self.address)
    }

    fn first_word_is_zero(&self) -> bool {
        self.as_bytes().get(..4).map_or(true, |w| w == [0; 4])
    }
}

impl Session {
    /// Locate the PM table and take the first snapshot
    ///
    /// Does nothing if the table is already initialised.
    ///
    /// # Errors
    ///
    /// Returns error if the family has no table messages, PSMU is absent or
    /// refuses a query, or the first refresh fails. A failed first refresh
    /// still leaves the table located; the next refresh retries the copy.
    pub fn init_table(&mut self) -> Result<()> {
        if self.table.is_some() {
            return Ok(());
        }
        let msgs = self.table_messages()?;

        let version = self
            .send(EndpointKind::Psmu, &Request::new(msgs.version))?
            .args[0];
        let reply = self.send(EndpointKind::Psmu, &Request::new(msgs.address))?;
        let address = msgs.address_width.decode(&reply.args);
        if address == 0 {
            return Err(SmuError::memory_access("SMU reported a null PM table address"));
        }

        let size = match pm_table::known(version) {
            Some(known) => known.size,
            None => {
                let size = self
                    .backend
                    .reported_table_size()
                    .unwrap_or(FALLBACK_TABLE_SIZE);
                warn!("Unknown PM table version {version:#x}, assuming {size:#x} bytes");
                size
            }
        };

        info!("PM table version {version:#x}, {size:#x} bytes at {address:#x}");
        self.table = Some(PmTable::new(version, size, address));
        self.refresh_table()
    }

    /// Take a fresh snapshot of the PM table
    ///
    /// Initialises the table first if needed.
    ///
    /// # Errors
    ///
    /// Returns error if the transfer or the copy fails. The previous
    /// snapshot is kept in that case.
    pub fn refresh_table(&mut self) -> Result<()> {
        let Some(table) = self.table.as_ref() else {
            return self.init_table();
        };
        let address = table.address;
        let mut fresh = table.blank();

        let transfer = !table.populated || self.backend.needs_transfer(address, table.as_bytes())?;
        if transfer {
            self.request_transfer_table()?;
        } else {
            debug!("PM table already republished by another client, copying only");
        }
        self.backend.copy_table(address, fresh.as_bytes_mut())?;

        if smu::has_stale_first_transfer(self.family()) && fresh.first_word_is_zero() {
            debug!("PM table came back empty, transferring again");
            std::thread::sleep(Duration::from_millis(smu::STALE_TABLE_DELAY_MS));
            self.request_transfer_table()?;
            self.backend.copy_table(address, fresh.as_bytes_mut())?;
        }

        fresh.populated = true;
        self.table = Some(fresh);
        Ok(())
    }

    /// Ask the SMU to publish a new snapshot
    ///
    /// A `RejectedPrerequisite` reply is retried twice, after 10 ms and
    /// then 100 ms. Any other failure is returned at once.
    ///
    /// # Errors
    ///
    /// Returns the last failure if every attempt was rejected.
    pub fn request_transfer_table(&mut self) -> Result<()> {
        let msgs = self.table_messages()?;
        let request = Request::with_arg(msgs.transfer, msgs.transfer_arg);

        let mut retries = smu::TRANSFER_RETRY_DELAYS_MS.iter();
        loop {
            let err = match self.send(EndpointKind::Psmu, &request) {
                Ok(_) => return Ok(()),
                Err(e) => e,
            };
            let busy = matches!(
                err,
                SmuError::SmuRejected {
                    status: Status::RejectedPrerequisite,
                    ..
                }
            );
            match retries.next() {
                Some(&ms) if busy => {
                    warn!("PM table transfer rejected, retrying in {ms}ms");
                    std::thread::sleep(Duration::from_millis(ms));
                }
                _ => return Err(err),
            }
        }
    }

    /// Cached table, if initialised
    pub fn pm_table(&self) -> Option<&PmTable> {
        self.table.as_ref()
    }

    /// Table version, if initialised
    pub fn table_version(&self) -> Option<u32> {
        self.table.as_ref().map(PmTable::version)
    }

    /// Table size in bytes, if initialised
    pub fn table_size(&self) -> Option<usize> {
        self.table.as_ref().map(PmTable::size)
    }

    /// Raw `f32` view of the last good snapshot
    pub fn table_values(&self) -> Option<&[f32]> {
        self.table
            .as_ref()
            .filter(|t| t.is_populated())
            .map(PmTable::values)
    }

    fn table_messages(&self) -> Result<TableMessages> {
        let family = self.family();
        smu::table_messages(family).ok_or_else(|| SmuError::family_unsupported(family, "PM table"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpopulated_reads_are_nan() {
        let table = PmTable::new(0x0037_0005, 0x8C8, 0x1000);
        assert!(table.read_f32(0x40).is_nan());
        assert_eq!(table.as_bytes().len(), 0x8C8);
        assert_eq!(table.values().len(), 0x8C8 / 4);
    }

    #[test]
    fn bounds_and_alignment() {
        let mut table = PmTable::new(0x0037_0005, 0x10, 0x1000);
        table.as_bytes_mut()[4..8].copy_from_slice(&2.5f32.to_le_bytes());
        table.populated = true;
        assert!((table.read_f32(4) - 2.5).abs() < f32::EPSILON);
        assert!(table.read_f32(2).is_nan());
        assert!(table.read_f32(0x10).is_nan());
        assert!(table.read_f32(0x0C).abs() < f32::EPSILON);
    }

    #[test]
    fn odd_reported_sizes_still_fit() {
        let table = PmTable::new(0x0099_9999, 0x7FE, 0x1000);
        assert_eq!(table.as_bytes().len(), 0x7FE);
        assert_eq!(table.values().len(), 0x1FF);
    }
}
