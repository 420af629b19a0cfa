//! Backend abstraction for SMN register and PM table access
//!
//! Every way of reaching the SMU (the ryzen_smu kernel module, raw `/dev/mem`
//! plus PCI config space, or the in-memory simulator) implements
//! [`SmuBackend`]. The session picks one at open and owns it as a trait object.

use crate::config::SessionConfig;
use crate::error::Result;
use ryzen_chip::Family;
use std::fmt::Debug;

/// Register access backend trait
pub trait SmuBackend: Debug + Send + Sync {
    /// Read a 32-bit SMN register
    ///
    /// # Errors
    ///
    /// Returns error if the register window cannot be accessed.
    fn read_register(&mut self, addr: u32) -> Result<u32>;

    /// Write a 32-bit SMN register
    ///
    /// # Errors
    ///
    /// Returns error if the register window cannot be accessed.
    fn write_register(&mut self, addr: u32, value: u32) -> Result<()>;

    /// Copy `buffer.len()` bytes of the PM table at physical address `addr`
    ///
    /// # Errors
    ///
    /// Returns error if the memory cannot be mapped or read.
    fn copy_table(&mut self, addr: u64, buffer: &mut [u8]) -> Result<()>;

    /// Whether a transfer message is needed before the next copy
    ///
    /// Backends that read the table through the kernel always return `true`.
    /// Backends reading live physical memory return `true` only when the live
    /// table still matches `cached`, i.e. nobody else has published since.
    ///
    /// # Errors
    ///
    /// Returns error if the live table cannot be read.
    fn needs_transfer(&mut self, addr: u64, cached: &[u8]) -> Result<bool>;

    /// Table size as reported by the driver, if the backend knows it
    fn reported_table_size(&self) -> Option<usize>;

    /// Get backend type for debugging
    fn backend_type(&self) -> BackendType;

    /// Family the backend is bound to, when it is not real silicon
    fn family_hint(&self) -> Option<Family> {
        None
    }
}

/// Backend type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// ryzen_smu kernel module (/sys/kernel/ryzen_smu_drv)
    KernelModule,

    /// PCI config space + /dev/mem
    DevMem,

    /// In-memory SMU model, no hardware required
    Simulated,
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::KernelModule => write!(f, "ryzen_smu kernel module"),
            Self::DevMem => write!(f, "/dev/mem"),
            Self::Simulated => write!(f, "Simulated SMU"),
        }
    }
}

/// Backend selection strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendSelection {
    /// Kernel module if loaded, otherwise /dev/mem
    #[default]
    Auto,

    /// Force the ryzen_smu kernel module
    KernelModule,

    /// Force PCI config space + /dev/mem
    DevMem,

    /// Force the simulated SMU (for CI and dry runs)
    Simulated,
}

impl std::str::FromStr for BackendSelection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "kernel" | "kernel-module" | "ryzen_smu" => Ok(Self::KernelModule),
            "devmem" | "dev-mem" | "mem" => Ok(Self::DevMem),
            "sim" | "simulated" => Ok(Self::Simulated),
            other => Err(format!(
                "unknown backend '{other}' (expected auto, kernel, devmem or simulated)"
            )),
        }
    }
}

/// Select appropriate backend based on availability and configuration
///
/// # Errors
///
/// Returns error if no suitable backend can be opened.
pub fn select_backend(config: &SessionConfig) -> Result<Box<dyn SmuBackend>> {
    use crate::backends::devmem::DevMemBackend;
    use crate::backends::kernel::KernelModuleBackend;
    use crate::backends::simulated::SimulatedBackend;

    match config.backend {
        BackendSelection::Auto => {
            // Kernel module first: no /dev/mem and no iomem=relaxed needed
            match KernelModuleBackend::open(&config.driver_root) {
                Ok(backend) => {
                    tracing::info!("Using kernel module backend at {}", config.driver_root.display());
                    return Ok(Box::new(backend));
                }
                Err(e) => tracing::debug!("Kernel module backend unavailable: {e}"),
            }

            tracing::info!("ryzen_smu not loaded, using /dev/mem backend");
            DevMemBackend::open().map(|b| Box::new(b) as Box<dyn SmuBackend>)
        }

        BackendSelection::KernelModule => KernelModuleBackend::open(&config.driver_root)
            .map(|b| Box::new(b) as Box<dyn SmuBackend>),

        BackendSelection::DevMem => DevMemBackend::open().map(|b| Box::new(b) as Box<dyn SmuBackend>),

        BackendSelection::Simulated => {
            let family = config.family_override.unwrap_or(Family::Renoir);
            tracing::info!("Using simulated SMU ({family})");
            Ok(Box::new(SimulatedBackend::new(family)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_selection() {
        assert_eq!("auto".parse(), Ok(BackendSelection::Auto));
        assert_eq!("Kernel".parse(), Ok(BackendSelection::KernelModule));
        assert_eq!("devmem".parse(), Ok(BackendSelection::DevMem));
        assert_eq!("simulated".parse(), Ok(BackendSelection::Simulated));
        assert!("winring0".parse::<BackendSelection>().is_err());
    }

    #[test]
    fn simulated_selection_needs_no_hardware() {
        let config = SessionConfig {
            backend: BackendSelection::Simulated,
            ..SessionConfig::default()
        };
        let backend = select_backend(&config).unwrap();
        assert_eq!(backend.backend_type(), BackendType::Simulated);
    }
}
