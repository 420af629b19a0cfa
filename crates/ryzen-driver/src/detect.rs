//! SoC family detection
//!
//! Detection runs at most once per session; the result is cached there.

use ryzen_chip::family::CPUID_VENDOR_AMD;
use ryzen_chip::Family;
use std::fmt::Debug;

/// Source of the SoC family
pub trait FamilyDetector: Debug + Send + Sync {
    /// Identify the running SoC. Returns [`Family::Unknown`] for anything unsupported.
    fn detect(&self) -> Family;
}

/// CPUID based detection on the running CPU
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuidDetector;

impl FamilyDetector for CpuidDetector {
    #[cfg(target_arch = "x86_64")]
    fn detect(&self) -> Family {
        use core::arch::x86_64::__cpuid;

        // SAFETY: CPUID is available on every x86_64 processor; leaves 0 and 1
        // are always implemented and have no side effects.
        let (leaf0, leaf1) = unsafe { (__cpuid(0), __cpuid(1)) };

        let mut vendor = [0u8; 12];
        vendor[..4].copy_from_slice(&leaf0.ebx.to_le_bytes());
        vendor[4..8].copy_from_slice(&leaf0.edx.to_le_bytes());
        vendor[8..].copy_from_slice(&leaf0.ecx.to_le_bytes());

        if &vendor[..] != CPUID_VENDOR_AMD.as_bytes() {
            tracing::warn!(
                "Not an AMD processor (vendor {:?})",
                String::from_utf8_lossy(&vendor)
            );
            return Family::Unknown;
        }

        let family = Family::from_cpuid_eax(leaf1.eax);
        tracing::debug!("CPUID leaf 1 eax={:#010x}: {family}", leaf1.eax);
        family
    }

    #[cfg(not(target_arch = "x86_64"))]
    fn detect(&self) -> Family {
        tracing::warn!("CPUID detection is only available on x86_64");
        Family::Unknown
    }
}

/// A family chosen up front (configuration override, simulated backends, tests)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedFamily(pub Family);

impl FamilyDetector for FixedFamily {
    fn detect(&self) -> Family {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_family() {
        assert_eq!(FixedFamily(Family::Cezanne).detect(), Family::Cezanne);
    }

    #[test]
    fn cpuid_never_panics() {
        // Whatever the build host is, detection yields some family
        let family = CpuidDetector.detect();
        println!("Detected {family}");
    }
}
