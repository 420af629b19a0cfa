//! Pure Rust SMU driver for AMD Ryzen mobile SoCs.
//!
//! Reads and adjusts power, thermal and clock limits by talking to the
//! System Management Unit over its SMN mailboxes, and decodes the PM table
//! the SMU publishes in physical memory.
//!
//! # Backend hierarchy
//!
//! ```text
//! Primary (ryzen_smu module loaded):
//!   KernelModuleBackend — /sys/kernel/ryzen_smu_drv/{smn,pm_table}
//!
//! Fallback (root, iomem=relaxed):
//!   DevMemBackend — PCI config 0xB8/0xBC + /dev/mem
//!
//! Development:
//!   SimulatedBackend — in-memory SMU model
//! ```
//!
//! # Quick start
//!
//! ```no_run
//! use ryzen_driver::{Session, SessionConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = Session::open(&SessionConfig::from_env())?;
//! println!("{} (BIOS interface {:#x})", session.family(), session.bios_interface_version()?);
//!
//! session.set_stapm_limit(25_000)?;
//! session.refresh_table()?;
//! println!("STAPM {:.1} W of {:.1} W", session.stapm_value(), session.stapm_limit());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]

mod backend;
pub mod backends;
mod config;
pub mod detect;
mod dispatch;
mod error;
mod io;
pub mod mailbox;
mod metrics;
mod pm_table;
mod session;

/// Silicon model (re-exported from ryzen-chip).
pub mod chip {
    pub use ryzen_chip::pm_table::{reports_core_clock_in_ghz, CoreMetric, Metric};
    pub use ryzen_chip::tunable::{lookup, supported_families, TunableRow, TABLE};
    pub use ryzen_chip::{EndpointKind, Family, Route, Status, Tunable};
}

pub use backend::{select_backend, BackendSelection, BackendType, SmuBackend};
pub use backends::{DevMemBackend, KernelModuleBackend, SimulatedBackend};
pub use config::{SessionConfig, UnknownFamilyPolicy, DEFAULT_DRIVER_ROOT, DEFAULT_RESPONSE_TIMEOUT};
pub use detect::{CpuidDetector, FamilyDetector, FixedFamily};
pub use error::{
    Result, SmuError, ADJ_ERR_FAM_UNSUPPORTED, ADJ_ERR_MEMORY_ACCESS, ADJ_ERR_SMU_REJECTED,
    ADJ_ERR_SMU_TIMEOUT, ADJ_ERR_SMU_UNSUPPORTED,
};
pub use io::SysfsFile;
pub use mailbox::{Mailbox, Request, Response};
pub use pm_table::PmTable;
pub use session::Session;

/// Commonly used types.
pub mod prelude {
    pub use crate::chip::{CoreMetric, EndpointKind, Family, Metric, Status, Tunable};
    pub use crate::{
        BackendSelection, Result, Session, SessionConfig, SimulatedBackend, SmuError,
        UnknownFamilyPolicy,
    };
}
