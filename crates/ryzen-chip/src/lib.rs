//! Silicon model for the AMD Ryzen System Management Unit (SMU).
//!
//! This crate has **no dependencies** and **no hardware access**. It is a
//! pure model of the platform: SoC families, SMU mailbox register layouts,
//! the mailbox response codes, the per-family message ids for every tunable,
//! and the versioned PM table layouts.
//!
//! Everything here was established by probing real parts; the values are
//! reverse engineered and are not published by the vendor.
//!
//! # Crate organisation
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`family`] | SoC family enum and CPUID family/model decoding |
//! | [`mailbox`] | MP1 / PSMU register layouts per family |
//! | [`smu`] | Response codes, classification, table message ids |
//! | [`tunable`] | `(tunable, family) → message id + mailbox` dispatch table |
//! | [`pm_table`] | PM table version → size and metric offsets |

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod family;
pub mod mailbox;
pub mod pm_table;
pub mod smu;
pub mod tunable;

pub use family::Family;
pub use mailbox::{EndpointKind, MailboxAddrs};
pub use smu::{Outcome, Status};
pub use tunable::{Encoding, Route, Tunable};
