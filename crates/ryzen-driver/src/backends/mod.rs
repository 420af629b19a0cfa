//! SMU backend implementations
//!
//! Three backends available:
//! - **Kernel module**: ryzen_smu sysfs nodes (no root-only `/dev/mem`, preferred)
//! - **DevMem**: PCI config space index/data pair plus `/dev/mem` for the table
//! - **Simulated**: in-memory SMU model for CI, tests and dry runs

pub mod devmem;
pub mod kernel;
pub mod physmem;
pub mod simulated;

pub use devmem::DevMemBackend;
pub use kernel::KernelModuleBackend;
pub use simulated::{LivePolicy, SimulatedBackend, Transaction};
