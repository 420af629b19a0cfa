//! SMU response codes and the PM table message set.
//!
//! The response register reads 0 until firmware has processed the message,
//! then holds one of the codes below.

use crate::family::Family;
use std::fmt;

// ── Response codes ───────────────────────────────────────────────────────────

/// Message executed.
pub const RESPONSE_OK: u32 = 0x01;
/// Message failed.
pub const RESPONSE_FAILED: u32 = 0xFF;
/// Firmware does not implement this message id.
pub const RESPONSE_UNKNOWN_CMD: u32 = 0xFE;
/// A prerequisite was not met (usually a transfer still in flight).
pub const RESPONSE_REJECTED_PREREQ: u32 = 0xFD;
/// Mailbox busy.
pub const RESPONSE_REJECTED_BUSY: u32 = 0xFC;

// ── Common messages ──────────────────────────────────────────────────────────

/// Test message; answered with OK by every live mailbox.
pub const TEST_MESSAGE: u32 = 0x01;

/// MP1 message returning the BIOS interface version in arg0.
pub const GET_BIOS_IF_VERSION: u32 = 0x03;

/// Value written to arg0 to check the register bus is writable.
pub const PROBE_SENTINEL: u32 = 0x47;

/// Decoded response register value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// `0x01`
    Ok,
    /// `0xFF`
    Failed,
    /// `0xFE`
    UnknownCommand,
    /// `0xFD`
    RejectedPrerequisite,
    /// `0xFC`
    RejectedBusy,
    /// Any other nonzero value.
    Other(u32),
}

/// How a [`Status`] is reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Request accepted.
    Success,
    /// The firmware does not know the message.
    Unsupported,
    /// The firmware knew the message but refused it.
    Rejected,
}

impl Status {
    /// Decode a raw response register value.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        match raw {
            RESPONSE_OK => Self::Ok,
            RESPONSE_FAILED => Self::Failed,
            RESPONSE_UNKNOWN_CMD => Self::UnknownCommand,
            RESPONSE_REJECTED_PREREQ => Self::RejectedPrerequisite,
            RESPONSE_REJECTED_BUSY => Self::RejectedBusy,
            other => Self::Other(other),
        }
    }

    /// Raw register value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        match self {
            Self::Ok => RESPONSE_OK,
            Self::Failed => RESPONSE_FAILED,
            Self::UnknownCommand => RESPONSE_UNKNOWN_CMD,
            Self::RejectedPrerequisite => RESPONSE_REJECTED_PREREQ,
            Self::RejectedBusy => RESPONSE_REJECTED_BUSY,
            Self::Other(raw) => raw,
        }
    }

    /// Classify into success / unsupported / rejected. Total over all codes.
    #[must_use]
    pub const fn outcome(self) -> Outcome {
        match self {
            Self::Ok => Outcome::Success,
            Self::UnknownCommand => Outcome::Unsupported,
            Self::Failed | Self::RejectedPrerequisite | Self::RejectedBusy | Self::Other(_) => {
                Outcome::Rejected
            }
        }
    }

    /// `true` for [`Status::Ok`].
    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => f.write_str("OK"),
            Self::Failed => f.write_str("failed"),
            Self::UnknownCommand => f.write_str("unknown command"),
            Self::RejectedPrerequisite => f.write_str("rejected (prerequisite not met)"),
            Self::RejectedBusy => f.write_str("rejected (busy)"),
            Self::Other(raw) => write!(f, "unexpected response {raw:#x}"),
        }
    }
}

// ── PM table messages ────────────────────────────────────────────────────────

/// How the SMU reports the physical address of the PM table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableAddress {
    /// Address is arg0.
    Bits32,
    /// Address is `arg1 << 32 | arg0`.
    Bits64,
}

impl TableAddress {
    /// Assemble the address from the reply arguments.
    #[must_use]
    pub const fn decode(self, args: &[u32; 6]) -> u64 {
        match self {
            Self::Bits32 => args[0] as u64,
            Self::Bits64 => ((args[1] as u64) << 32) | args[0] as u64,
        }
    }
}

/// PSMU message ids used to locate and publish the PM table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableMessages {
    /// Returns the table version in arg0.
    pub version: u32,
    /// Returns the table physical address.
    pub address: u32,
    /// Address encoding in the reply.
    pub address_width: TableAddress,
    /// Tells the SMU to publish a fresh snapshot.
    pub transfer: u32,
    /// arg0 sent with the transfer message.
    pub transfer_arg: u32,
}

const RAVEN_TABLE: TableMessages = TableMessages {
    version: 0x0C,
    address: 0x0B,
    address_width: TableAddress::Bits32,
    transfer: 0x3D,
    transfer_arg: 3,
};

const RENOIR_TABLE: TableMessages = TableMessages {
    version: 0x06,
    address: 0x66,
    address_width: TableAddress::Bits64,
    transfer: 0x65,
    transfer_arg: 0,
};

const DRAGON_TABLE: TableMessages = TableMessages {
    version: 0x05,
    address: 0x04,
    address_width: TableAddress::Bits64,
    transfer: 0x03,
    transfer_arg: 0,
};

/// PM table message set for `family`, or `None` for unknown silicon.
#[must_use]
pub const fn table_messages(family: Family) -> Option<TableMessages> {
    match family {
        Family::Raven | Family::Picasso | Family::Dali => Some(RAVEN_TABLE),
        Family::DragonRange | Family::FireRange => Some(DRAGON_TABLE),
        Family::Unknown => None,
        _ => Some(RENOIR_TABLE),
    }
}

/// Families whose first transfer after boot can publish an all-zero table.
#[must_use]
pub const fn has_stale_first_transfer(family: Family) -> bool {
    matches!(family, Family::Raven | Family::Picasso)
}

/// Delays before the 2nd and 3rd transfer attempt on `RejectedPrerequisite`.
pub const TRANSFER_RETRY_DELAYS_MS: [u64; 2] = [10, 100];

/// Wait before re-transferring a table whose first word is still zero.
pub const STALE_TABLE_DELAY_MS: u64 = 10;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_codes_decode() {
        assert_eq!(Status::from_raw(0x01), Status::Ok);
        assert_eq!(Status::from_raw(0xFF), Status::Failed);
        assert_eq!(Status::from_raw(0xFE), Status::UnknownCommand);
        assert_eq!(Status::from_raw(0xFD), Status::RejectedPrerequisite);
        assert_eq!(Status::from_raw(0xFC), Status::RejectedBusy);
        assert_eq!(Status::from_raw(0x42), Status::Other(0x42));
    }

    #[test]
    fn classification_is_total() {
        assert_eq!(Status::Ok.outcome(), Outcome::Success);
        assert_eq!(Status::UnknownCommand.outcome(), Outcome::Unsupported);
        for raw in [0xFF, 0xFD, 0xFC, 0x02, 0x7F, 0xFB, u32::MAX] {
            assert_eq!(Status::from_raw(raw).outcome(), Outcome::Rejected, "{raw:#x}");
        }
    }

    #[test]
    fn raw_value_survives_decoding() {
        for raw in 1..=0x100 {
            assert_eq!(Status::from_raw(raw).raw(), raw);
        }
    }

    #[test]
    fn table_message_groups() {
        let raven = table_messages(Family::Picasso).unwrap();
        assert_eq!((raven.version, raven.address, raven.transfer), (0x0C, 0x0B, 0x3D));
        assert_eq!(raven.transfer_arg, 3);
        assert_eq!(raven.address_width, TableAddress::Bits32);

        let renoir = table_messages(Family::Phoenix).unwrap();
        assert_eq!((renoir.version, renoir.address, renoir.transfer), (0x06, 0x66, 0x65));

        let dragon = table_messages(Family::FireRange).unwrap();
        assert_eq!((dragon.version, dragon.address, dragon.transfer), (0x05, 0x04, 0x03));

        assert!(table_messages(Family::Unknown).is_none());
    }

    #[test]
    fn address_assembly() {
        let args = [0xDEAD_0000, 0x0000_0001, 0, 0, 0, 0];
        assert_eq!(TableAddress::Bits32.decode(&args), 0xDEAD_0000);
        assert_eq!(TableAddress::Bits64.decode(&args), 0x1_DEAD_0000);
    }

    #[test]
    fn stale_first_transfer_families() {
        assert!(has_stale_first_transfer(Family::Raven));
        assert!(has_stale_first_transfer(Family::Picasso));
        assert!(!has_stale_first_transfer(Family::Dali));
        assert!(!has_stale_first_transfer(Family::Renoir));
    }
}
