//! Simulated SMU backend
//!
//! An in-memory model of the SMN register file with both mailboxes and a PM
//! table. Writing a mailbox's message register executes the message the way
//! firmware does: arguments are read, the response register and result
//! arguments are written. This enables:
//!
//! 1. **CI without hardware**: every session, dispatch and table path runs
//!    against the same register protocol the real SMU speaks.
//!
//! 2. **Fault injection**: scripted rejections, unresponsive or read-only
//!    mailboxes, and the all-zero first transfer some APUs produce.
//!
//! 3. **Dry runs**: `ryzen --backend simulated` shows what would be sent.
//!
//! ## Message handling
//!
//! ```text
//! scripted non-OK status        → replied as-is, no side effects
//! TEST_MESSAGE (0x1)            → OK (unless the probe is set to fail)
//! MP1 GET_BIOS_IF_VERSION (0x3) → OK, arg0 = BIOS interface version
//! PSMU table version/address    → OK, args = version / physical address
//! PSMU table transfer           → OK, live table copied to "physical memory"
//! any route in the tunable table for this family → OK
//! everything else               → UnknownCommand
//! ```
//!
//! Clones share state, so a test can keep a handle after the session takes
//! ownership of the backend.

use crate::backend::{BackendType, SmuBackend};
use crate::error::{Result, SmuError};
use ryzen_chip::mailbox::{self, ARG_COUNT};
use ryzen_chip::smu::{self, TableAddress};
use ryzen_chip::{pm_table, tunable, EndpointKind, Family, MailboxAddrs, Status};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// One message as seen by the simulated firmware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transaction {
    /// Mailbox the message arrived on
    pub endpoint: EndpointKind,
    /// Message id
    pub message: u32,
    /// Arguments as written by the host
    pub args: [u32; ARG_COUNT],
    /// Reply, or `None` if the mailbox never answered
    pub status: Option<Status>,
}

/// How `needs_transfer` behaves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LivePolicy {
    /// Always transfer, like the kernel module
    #[default]
    AlwaysTransfer,
    /// Transfer only if published memory still equals the cached copy, like /dev/mem
    CompareLive,
}

#[derive(Debug, Clone, Copy)]
struct EndpointModel {
    kind: EndpointKind,
    addrs: MailboxAddrs,
    read_only: bool,
    unresponsive: bool,
    fail_test: bool,
}

impl EndpointModel {
    fn new(family: Family, kind: EndpointKind) -> Self {
        Self {
            kind,
            addrs: mailbox::resolve(family, kind).unwrap_or(mailbox::legacy_default(kind)),
            read_only: false,
            unresponsive: false,
            fail_test: false,
        }
    }

    fn owns(&self, addr: u32) -> bool {
        addr == self.addrs.message
            || addr == self.addrs.response
            || (self.addrs.arg(0)..=self.addrs.arg(ARG_COUNT - 1)).contains(&addr)
    }
}

#[derive(Debug)]
struct SimState {
    family: Family,
    registers: HashMap<u32, u32>,
    endpoints: [EndpointModel; 2],
    scripted: HashMap<(EndpointKind, u32), VecDeque<Status>>,
    log: Vec<Transaction>,
    bios_version: u32,
    table_version: u32,
    table_addr: u64,
    live_table: Vec<u8>,
    published: Vec<u8>,
    transfers: usize,
    copies: usize,
    stale_first_transfer: bool,
    reported_size: Option<usize>,
    live_policy: LivePolicy,
}

impl SimState {
    fn endpoint_for(&self, addr: u32) -> Option<EndpointModel> {
        self.endpoints.iter().copied().find(|e| e.owns(addr))
    }

    fn endpoint_mut(&mut self, kind: EndpointKind) -> &mut EndpointModel {
        match kind {
            EndpointKind::Mp1 => &mut self.endpoints[0],
            EndpointKind::Psmu => &mut self.endpoints[1],
        }
    }

    fn execute(&mut self, ep: EndpointModel, message: u32) {
        let mut args = [0u32; ARG_COUNT];
        for (i, arg) in args.iter_mut().enumerate() {
            *arg = self.registers.get(&ep.addrs.arg(i)).copied().unwrap_or(0);
        }

        if ep.unresponsive {
            debug!("sim: {} ignoring message {message:#x}", ep.kind);
            self.log.push(Transaction {
                endpoint: ep.kind,
                message,
                args,
                status: None,
            });
            return;
        }

        let scripted = self
            .scripted
            .get_mut(&(ep.kind, message))
            .and_then(VecDeque::pop_front);

        let (status, reply) = match scripted {
            Some(status) if !status.is_ok() => (status, args),
            _ => self.handle(ep, message, args),
        };

        debug!("sim: {} message {message:#x} args {args:x?} -> {status}", ep.kind);
        self.log.push(Transaction {
            endpoint: ep.kind,
            message,
            args,
            status: Some(status),
        });

        for (i, value) in reply.iter().enumerate() {
            self.registers.insert(ep.addrs.arg(i), *value);
        }
        self.registers.insert(ep.addrs.response, status.raw());
    }

    fn handle(
        &mut self,
        ep: EndpointModel,
        message: u32,
        mut args: [u32; ARG_COUNT],
    ) -> (Status, [u32; ARG_COUNT]) {
        if message == smu::TEST_MESSAGE {
            let status = if ep.fail_test { Status::Failed } else { Status::Ok };
            return (status, args);
        }

        if ep.kind == EndpointKind::Mp1 && message == smu::GET_BIOS_IF_VERSION {
            args[0] = self.bios_version;
            return (Status::Ok, args);
        }

        if ep.kind == EndpointKind::Psmu {
            if let Some(msgs) = smu::table_messages(self.family) {
                if message == msgs.version {
                    args[0] = self.table_version;
                    return (Status::Ok, args);
                }
                if message == msgs.address {
                    #[allow(clippy::cast_possible_truncation)]
                    let (low, high) = (self.table_addr as u32, (self.table_addr >> 32) as u32);
                    args[0] = low;
                    args[1] = match msgs.address_width {
                        TableAddress::Bits32 => 0,
                        TableAddress::Bits64 => high,
                    };
                    return (Status::Ok, args);
                }
                if message == msgs.transfer {
                    self.transfers += 1;
                    self.published = if self.stale_first_transfer && self.transfers == 1 {
                        vec![0; self.live_table.len()]
                    } else {
                        self.live_table.clone()
                    };
                    return (Status::Ok, args);
                }
            }
        }

        let known = tunable::TABLE.iter().any(|row| {
            row.applies_to(self.family)
                && (row.primary.endpoint == ep.kind && row.primary.message == message
                    || row
                        .fallback
                        .is_some_and(|f| f.endpoint == ep.kind && f.message == message))
        });
        if known {
            (Status::Ok, args)
        } else {
            (Status::UnknownCommand, args)
        }
    }
}

/// Simulated SMU backend.
#[derive(Debug, Clone)]
pub struct SimulatedBackend {
    state: Arc<Mutex<SimState>>,
}

impl SimulatedBackend {
    /// SMU model for `family` with its usual table version and a filled table.
    pub fn new(family: Family) -> Self {
        let table_version = default_table_version(family);
        let table_addr = match smu::table_messages(family).map(|m| m.address_width) {
            Some(TableAddress::Bits32) => 0xDE00_0000,
            _ => 0x0000_0001_2345_0000,
        };
        let state = SimState {
            family,
            registers: HashMap::new(),
            endpoints: [
                EndpointModel::new(family, EndpointKind::Mp1),
                EndpointModel::new(family, EndpointKind::Psmu),
            ],
            scripted: HashMap::new(),
            log: Vec::new(),
            bios_version: 0x0000_0005,
            table_version,
            table_addr,
            live_table: synthetic_table(pm_table::table_size(table_version)),
            published: Vec::new(),
            transfers: 0,
            copies: 0,
            stale_first_transfer: smu::has_stale_first_transfer(family),
            reported_size: None,
            live_policy: LivePolicy::AlwaysTransfer,
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Report `version` and resize the live table to match.
    #[must_use]
    pub fn with_table_version(self, version: u32) -> Self {
        {
            let mut s = self.lock();
            s.table_version = version;
            s.live_table = synthetic_table(pm_table::table_size(version));
        }
        self
    }

    /// Replace the live table contents.
    #[must_use]
    pub fn with_table_values(self, values: &[f32]) -> Self {
        self.lock().live_table = bytemuck::cast_slice::<f32, u8>(values).to_vec();
        self
    }

    /// BIOS interface version returned by MP1 message 0x3.
    #[must_use]
    pub fn with_bios_version(self, version: u32) -> Self {
        self.lock().bios_version = version;
        self
    }

    /// Table size the backend claims the driver reports.
    #[must_use]
    pub fn with_reported_table_size(self, size: Option<usize>) -> Self {
        self.lock().reported_size = size;
        self
    }

    /// How `needs_transfer` answers.
    #[must_use]
    pub fn with_live_policy(self, policy: LivePolicy) -> Self {
        self.lock().live_policy = policy;
        self
    }

    /// Whether the first transfer publishes zeros.
    #[must_use]
    pub fn with_stale_first_transfer(self, stale: bool) -> Self {
        self.lock().stale_first_transfer = stale;
        self
    }

    /// Drop every write to `kind`'s registers (locked-down bus).
    #[must_use]
    pub fn read_only(self, kind: EndpointKind) -> Self {
        self.lock().endpoint_mut(kind).read_only = true;
        self
    }

    /// Accept messages on `kind` but never answer.
    #[must_use]
    pub fn unresponsive(self, kind: EndpointKind) -> Self {
        self.set_unresponsive(kind, true);
        self
    }

    /// Make `kind` stop (or resume) answering on a backend already in use.
    pub fn set_unresponsive(&self, kind: EndpointKind, silent: bool) {
        self.lock().endpoint_mut(kind).unresponsive = silent;
    }

    /// Answer the test message on `kind` with Failed.
    #[must_use]
    pub fn failing_probe(self, kind: EndpointKind) -> Self {
        self.lock().endpoint_mut(kind).fail_test = true;
        self
    }

    /// Queue replies for `message` on `kind`; consumed one per attempt.
    #[must_use]
    pub fn script(self, kind: EndpointKind, message: u32, replies: &[Status]) -> Self {
        self.push_replies(kind, message, replies);
        self
    }

    /// Queue replies on a backend that is already in use.
    pub fn push_replies(&self, kind: EndpointKind, message: u32, replies: &[Status]) {
        self.lock()
            .scripted
            .entry((kind, message))
            .or_default()
            .extend(replies.iter().copied());
    }

    /// Overwrite one `f32` slot of the live table.
    pub fn set_table_f32(&self, offset: usize, value: f32) {
        let mut s = self.lock();
        if let Some(slot) = s.live_table.get_mut(offset..offset + 4) {
            slot.copy_from_slice(&value.to_le_bytes());
        }
    }

    /// Publish the live table without a transfer message, as another SMU
    /// client would.
    pub fn publish_now(&self) {
        let mut s = self.lock();
        s.published = s.live_table.clone();
    }

    /// Family this model answers for.
    pub fn family(&self) -> Family {
        self.lock().family
    }

    /// Every message executed so far.
    pub fn transactions(&self) -> Vec<Transaction> {
        self.lock().log.clone()
    }

    /// Messages executed on `kind` with id `message`.
    pub fn count(&self, kind: EndpointKind, message: u32) -> usize {
        self.lock()
            .log
            .iter()
            .filter(|t| t.endpoint == kind && t.message == message)
            .count()
    }

    /// Forget the transaction log.
    pub fn clear_log(&self) {
        self.lock().log.clear();
    }

    /// Table transfers executed.
    pub fn transfer_count(&self) -> usize {
        self.lock().transfers
    }

    /// Table copies served.
    pub fn copy_count(&self) -> usize {
        self.lock().copies
    }

    /// Physical address the table is published at.
    pub fn table_address(&self) -> u64 {
        self.lock().table_addr
    }

    /// Raw register value, for assertions.
    pub fn register(&self, addr: u32) -> u32 {
        self.lock().registers.get(&addr).copied().unwrap_or(0)
    }
}

impl SmuBackend for SimulatedBackend {
    fn read_register(&mut self, addr: u32) -> Result<u32> {
        let value = self.register(addr);
        tracing::trace!("sim read {addr:#010x} = {value:#x}");
        Ok(value)
    }

    fn write_register(&mut self, addr: u32, value: u32) -> Result<()> {
        tracing::trace!("sim write {addr:#010x} = {value:#x}");
        let mut s = self.lock();
        match s.endpoint_for(addr) {
            Some(ep) if ep.read_only => {}
            Some(ep) if addr == ep.addrs.message => {
                s.registers.insert(addr, value);
                s.execute(ep, value);
            }
            _ => {
                s.registers.insert(addr, value);
            }
        }
        Ok(())
    }

    fn copy_table(&mut self, addr: u64, buffer: &mut [u8]) -> Result<()> {
        let mut s = self.lock();
        if addr != s.table_addr {
            return Err(SmuError::memory_access(format!(
                "No table at {addr:#x} (published at {:#x})",
                s.table_addr
            )));
        }
        if let Some(size) = s.reported_size {
            if size != buffer.len() {
                return Err(SmuError::memory_access(format!(
                    "pm_table size mismatch: driver reports {size:#x}, expected {:#x}",
                    buffer.len()
                )));
            }
        }
        buffer.fill(0);
        let n = buffer.len().min(s.published.len());
        buffer[..n].copy_from_slice(&s.published[..n]);
        s.copies += 1;
        Ok(())
    }

    fn needs_transfer(&mut self, _addr: u64, cached: &[u8]) -> Result<bool> {
        let s = self.lock();
        Ok(match s.live_policy {
            LivePolicy::AlwaysTransfer => true,
            LivePolicy::CompareLive => s.published.get(..cached.len()) == Some(cached),
        })
    }

    fn reported_table_size(&self) -> Option<usize> {
        self.lock().reported_size
    }

    fn backend_type(&self) -> BackendType {
        BackendType::Simulated
    }

    fn family_hint(&self) -> Option<Family> {
        Some(self.family())
    }
}

/// Table version the simulator reports for `family` by default.
pub const fn default_table_version(family: Family) -> u32 {
    match family {
        Family::Raven | Family::Picasso | Family::Dali => 0x001E_0004,
        Family::Renoir | Family::Lucienne => 0x0037_0005,
        Family::Cezanne => 0x0040_0005,
        Family::Vangogh => 0x003F_0000,
        Family::Rembrandt => 0x0045_0005,
        Family::Phoenix | Family::HawkPoint => 0x004C_0006,
        Family::StrixPoint => 0x005D_0009,
        Family::KrackanPoint => 0x0065_0005,
        Family::StrixHalo => 0x0064_020C,
        Family::DragonRange | Family::FireRange => 0x0054_0004,
        // No confirmed layout; exercises the fallback path
        Family::Mendocino | Family::Unknown => 0x0058_0002,
    }
}

/// Slot `i` holds `i + 1` so every offset reads back a distinct nonzero value.
fn synthetic_table(size: usize) -> Vec<u8> {
    (0..size / 4)
        .flat_map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let v = (i + 1) as f32;
            v.to_le_bytes()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ryzen_chip::mailbox::{MP1_LAYOUT_1, PSMU_LAYOUT_1};

    #[test]
    fn test_message_round_trip() {
        let mut sim = SimulatedBackend::new(Family::Renoir);
        sim.write_register(MP1_LAYOUT_1.response, 0).unwrap();
        sim.write_register(MP1_LAYOUT_1.message, smu::TEST_MESSAGE).unwrap();
        assert_eq!(sim.read_register(MP1_LAYOUT_1.response).unwrap(), 1);
        assert_eq!(sim.transactions().len(), 1);
    }

    #[test]
    fn read_only_endpoint_drops_writes() {
        let mut sim = SimulatedBackend::new(Family::Renoir).read_only(EndpointKind::Psmu);
        sim.write_register(PSMU_LAYOUT_1.arg_base, smu::PROBE_SENTINEL).unwrap();
        assert_eq!(sim.read_register(PSMU_LAYOUT_1.arg_base).unwrap(), 0);
        sim.write_register(MP1_LAYOUT_1.arg_base, smu::PROBE_SENTINEL).unwrap();
        assert_eq!(sim.read_register(MP1_LAYOUT_1.arg_base).unwrap(), 0x47);
    }

    #[test]
    fn unknown_messages_are_rejected_as_unknown() {
        let mut sim = SimulatedBackend::new(Family::Renoir);
        sim.write_register(MP1_LAYOUT_1.message, 0x7777).unwrap();
        assert_eq!(sim.read_register(MP1_LAYOUT_1.response).unwrap(), 0xFE);
    }

    #[test]
    fn scripted_replies_are_consumed_in_order() {
        let mut sim = SimulatedBackend::new(Family::Renoir).script(
            EndpointKind::Mp1,
            0x14,
            &[Status::RejectedBusy],
        );
        sim.write_register(MP1_LAYOUT_1.message, 0x14).unwrap();
        assert_eq!(sim.read_register(MP1_LAYOUT_1.response).unwrap(), 0xFC);
        sim.write_register(MP1_LAYOUT_1.message, 0x14).unwrap();
        assert_eq!(sim.read_register(MP1_LAYOUT_1.response).unwrap(), 0x01);
    }

    #[test]
    fn synthetic_table_matches_size() {
        let sim = SimulatedBackend::new(Family::Renoir);
        assert_eq!(sim.lock().live_table.len(), 0x8C8);
        let slot: [u8; 4] = sim.lock().live_table[0x40..0x44].try_into().unwrap();
        assert_eq!(f32::from_le_bytes(slot), 17.0);
    }
}
