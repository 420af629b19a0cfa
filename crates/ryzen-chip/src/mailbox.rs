//! SMU mailbox register layouts.
//!
//! Each SMU exposes a C2PMSG mailbox on the System Management Network (SMN):
//! a message register (writing it starts execution), a response register
//! (nonzero once the SMU answers) and six consecutive argument registers.
//!
//! ```text
//! layout   message     response    arg base    families
//! MP1 #1   0x03B10528  0x03B10564  0x03B10998  Raven .. Cezanne
//! MP1 #2   0x03B10528  0x03B10578  0x03B10998  Vangogh, Rembrandt, Mendocino, Phoenix, Hawk Point
//! MP1 #3   0x03B10928  0x03B10978  0x03B10998  Krackan, Strix Point, Strix Halo
//! MP1 #4   0x03B10530  0x03B1057C  0x03B109C4  Dragon Range, Fire Range
//! PSMU #1  0x03B10A20  0x03B10A80  0x03B10A88  all mobile APUs
//! PSMU #2  0x03B10524  0x03B10570  0x03B10A40  Dragon Range, Fire Range
//! ```

use crate::family::Family;
use std::fmt;

/// Number of 32-bit argument registers in every mailbox.
pub const ARG_COUNT: usize = 6;

/// Which SMU a mailbox belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointKind {
    /// MP1, the primary power-management firmware.
    Mp1,
    /// PSMU (a.k.a. RSMU), the secondary mailbox; also serves PM table requests.
    Psmu,
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mp1 => f.write_str("MP1"),
            Self::Psmu => f.write_str("PSMU"),
        }
    }
}

/// The three fixed SMN addresses of one mailbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MailboxAddrs {
    /// Message id register.
    pub message: u32,
    /// Response code register.
    pub response: u32,
    /// First argument register; argument `i` lives at `arg_base + 4 * i`.
    pub arg_base: u32,
}

impl MailboxAddrs {
    /// Address of argument register `index`.
    #[must_use]
    pub const fn arg(&self, index: usize) -> u32 {
        // index < ARG_COUNT, so the cast cannot truncate
        #[allow(clippy::cast_possible_truncation)]
        let index = index as u32;
        self.arg_base + 4 * index
    }
}

/// MP1 layout used by the first Zen APUs through Cezanne.
pub const MP1_LAYOUT_1: MailboxAddrs = MailboxAddrs {
    message: 0x03B1_0528,
    response: 0x03B1_0564,
    arg_base: 0x03B1_0998,
};

/// MP1 layout for Vangogh, Rembrandt, Mendocino, Phoenix and Hawk Point.
pub const MP1_LAYOUT_2: MailboxAddrs = MailboxAddrs {
    message: 0x03B1_0528,
    response: 0x03B1_0578,
    arg_base: 0x03B1_0998,
};

/// MP1 layout for the Zen 5 APUs.
pub const MP1_LAYOUT_3: MailboxAddrs = MailboxAddrs {
    message: 0x03B1_0928,
    response: 0x03B1_0978,
    arg_base: 0x03B1_0998,
};

/// MP1 layout for Dragon Range and Fire Range.
pub const MP1_LAYOUT_4: MailboxAddrs = MailboxAddrs {
    message: 0x03B1_0530,
    response: 0x03B1_057C,
    arg_base: 0x03B1_09C4,
};

/// PSMU layout shared by all mobile APUs.
pub const PSMU_LAYOUT_1: MailboxAddrs = MailboxAddrs {
    message: 0x03B1_0A20,
    response: 0x03B1_0A80,
    arg_base: 0x03B1_0A88,
};

/// PSMU layout for Dragon Range and Fire Range.
pub const PSMU_LAYOUT_2: MailboxAddrs = MailboxAddrs {
    message: 0x03B1_0524,
    response: 0x03B1_0570,
    arg_base: 0x03B1_0A40,
};

/// Resolve the mailbox addresses for `family`.
///
/// Returns `None` for [`Family::Unknown`]. Older releases silently reused
/// the first layout for anything unrecognised; callers that want that
/// behaviour must ask for it explicitly via [`legacy_default`].
#[must_use]
pub const fn resolve(family: Family, kind: EndpointKind) -> Option<MailboxAddrs> {
    use Family::{
        Cezanne, Dali, DragonRange, FireRange, HawkPoint, KrackanPoint, Lucienne, Mendocino,
        Phoenix, Picasso, Raven, Rembrandt, Renoir, StrixHalo, StrixPoint, Unknown, Vangogh,
    };

    match kind {
        EndpointKind::Mp1 => match family {
            Raven | Picasso | Dali | Renoir | Lucienne | Cezanne => Some(MP1_LAYOUT_1),
            Vangogh | Rembrandt | Mendocino | Phoenix | HawkPoint => Some(MP1_LAYOUT_2),
            KrackanPoint | StrixPoint | StrixHalo => Some(MP1_LAYOUT_3),
            DragonRange | FireRange => Some(MP1_LAYOUT_4),
            Unknown => None,
        },
        EndpointKind::Psmu => match family {
            DragonRange | FireRange => Some(PSMU_LAYOUT_2),
            Unknown => None,
            _ => Some(PSMU_LAYOUT_1),
        },
    }
}

/// The layout historically assumed for unrecognised families.
#[must_use]
pub const fn legacy_default(kind: EndpointKind) -> MailboxAddrs {
    match kind {
        EndpointKind::Mp1 => MP1_LAYOUT_1,
        EndpointKind::Psmu => PSMU_LAYOUT_1,
    }
}
