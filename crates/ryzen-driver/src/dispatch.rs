//! Tunable dispatch
//!
//! [`Session::set`] is the single path from a tunable to an SMU message. The
//! `set_*` methods are thin wrappers kept for callers that prefer named
//! setters.

use crate::error::{Result, SmuError};
use crate::mailbox::Request;
use crate::session::Session;
use ryzen_chip::tunable::{self, Route};
use ryzen_chip::Tunable;
use tracing::{debug, warn};

impl Session {
    /// Set `tunable` to `value` on the detected family
    ///
    /// Units are those the firmware expects (mW, mA, MHz, °C, seconds).
    /// When the primary route is refused and the row has a fallback, the
    /// fallback route is tried once.
    ///
    /// # Errors
    ///
    /// Returns `FamilyUnsupported` if the family has no row for `tunable`,
    /// or the last route's SMU error.
    pub fn set(&mut self, tunable: Tunable, value: u32) -> Result<()> {
        let family = self.family();
        let row = tunable::lookup(tunable, family)
            .ok_or_else(|| SmuError::family_unsupported(family, tunable.name()))?;
        let arg = row.encoding.encode(value);

        debug!("set {tunable} = {value} (arg0 {arg:#x}) via {}", row.primary);
        match self.send_route(row.primary, arg) {
            Err(e) if allows_fallback(&e) => match row.fallback {
                Some(fallback) => {
                    warn!("{tunable} via {} failed ({e}), retrying via {fallback}", row.primary);
                    self.send_route(fallback, arg)
                }
                None => Err(e),
            },
            other => other,
        }
    }

    fn send_route(&mut self, route: Route, arg: u32) -> Result<()> {
        self.send(route.endpoint, &Request::with_arg(route.message, arg))
            .map(|_| ())
    }
}

/// Firmware refusals and a missing primary mailbox are worth a second route;
/// timeouts and I/O faults are not.
const fn allows_fallback(err: &SmuError) -> bool {
    err.is_smu_reply() || matches!(err, SmuError::MailboxUnavailable { .. })
}

macro_rules! setters {
    ($($name:ident => $tunable:ident),* $(,)?) => {
        impl Session {
            $(
                #[doc = concat!("Shorthand for `set(Tunable::", stringify!($tunable), ", value)`.")]
                ///
                /// # Errors
                ///
                /// As for [`Session::set`].
                pub fn $name(&mut self, value: u32) -> Result<()> {
                    self.set(Tunable::$tunable, value)
                }
            )*
        }
    };
}

setters! {
    set_stapm_limit => StapmLimit,
    set_fast_limit => FastLimit,
    set_slow_limit => SlowLimit,
    set_slow_time => SlowTime,
    set_stapm_time => StapmTime,
    set_apu_slow_limit => ApuSlowLimit,
    set_skin_temp_power_limit => SkinTempPowerLimit,
    set_tctl_temp => TctlTemp,
    set_apu_skin_temp_limit => ApuSkinTempLimit,
    set_dgpu_skin_temp_limit => DgpuSkinTempLimit,
    set_vrm_current => VrmCurrent,
    set_vrmsoc_current => VrmSocCurrent,
    set_vrmgfx_current => VrmGfxCurrent,
    set_vrmcvip_current => VrmCvipCurrent,
    set_vrmmax_current => VrmMaxCurrent,
    set_vrmgfxmax_current => VrmGfxMaxCurrent,
    set_vrmsocmax_current => VrmSocMaxCurrent,
    set_psi0_current => Psi0Current,
    set_psi3cpu_current => Psi3CpuCurrent,
    set_psi0soc_current => Psi0SocCurrent,
    set_psi3gfx_current => Psi3GfxCurrent,
    set_max_gfxclk_freq => MaxGfxclkFreq,
    set_min_gfxclk_freq => MinGfxclkFreq,
    set_max_socclk_freq => MaxSocclkFreq,
    set_min_socclk_freq => MinSocclkFreq,
    set_max_fclk_freq => MaxFclkFreq,
    set_min_fclk_freq => MinFclkFreq,
    set_max_vcn => MaxVcn,
    set_min_vcn => MinVcn,
    set_max_lclk => MaxLclk,
    set_min_lclk => MinLclk,
    set_gfx_clk => GfxClk,
    set_prochot_deassertion_ramp => ProchotDeassertionRamp,
    set_oc_clk => OcClk,
    set_per_core_oc_clk => PerCoreOcClk,
    set_oc_volt => OcVolt,
    set_enable_oc => EnableOc,
    set_disable_oc => DisableOc,
    set_power_saving => PowerSaving,
    set_max_performance => MaxPerformance,
    set_coall => CoAll,
    set_coper => CoPer,
    set_cogfx => CoGfx,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::SimulatedBackend;
    use crate::config::SessionConfig;
    use ryzen_chip::{EndpointKind, Family, Status};

    fn open(sim: &SimulatedBackend) -> Session {
        Session::with_backend(Box::new(sim.clone()), &SessionConfig::default()).unwrap()
    }

    #[test]
    fn every_row_sends_its_message_and_encoding() {
        for row in tunable::TABLE {
            for &family in row.families {
                let sim = SimulatedBackend::new(family);
                let mut session = open(&sim);
                sim.clear_log();

                session.set(row.tunable, 85).unwrap();

                let log = sim.transactions();
                assert_eq!(log.len(), 1, "{} on {family}", row.tunable);
                assert_eq!(log[0].endpoint, row.primary.endpoint);
                assert_eq!(log[0].message, row.primary.message);
                assert_eq!(log[0].args[0], row.encoding.encode(85));
            }
        }
    }

    #[test]
    fn unsupported_family_sends_nothing() {
        let sim = SimulatedBackend::new(Family::DragonRange);
        let mut session = open(&sim);
        sim.clear_log();

        let err = session.set_vrmgfx_current(40_000).unwrap_err();
        assert!(matches!(
            err,
            SmuError::FamilyUnsupported {
                family: Family::DragonRange,
                ..
            }
        ));
        assert_eq!(err.code(), -1);
        assert!(sim.transactions().is_empty());
    }

    #[test]
    fn rejection_without_fallback_is_returned() {
        let sim = SimulatedBackend::new(Family::Rembrandt).script(
            EndpointKind::Mp1,
            0x14,
            &[Status::RejectedBusy],
        );
        let mut session = open(&sim);
        let err = session.set_stapm_limit(25_000).unwrap_err();
        assert_eq!(err.code(), -4);
        assert_eq!(sim.count(EndpointKind::Psmu, 0x31), 0);
    }

    #[test]
    fn missing_primary_mailbox_uses_fallback() {
        let sim = SimulatedBackend::new(Family::Renoir).read_only(EndpointKind::Mp1);
        let mut session = open(&sim);
        session.set_stapm_limit(25_000).unwrap();
        assert_eq!(sim.count(EndpointKind::Psmu, 0x31), 1);
    }

    #[test]
    fn skin_temperature_is_fixed_point() {
        let sim = SimulatedBackend::new(Family::Rembrandt);
        let mut session = open(&sim);
        sim.clear_log();
        session.set_apu_skin_temp_limit(45).unwrap();
        assert_eq!(sim.transactions()[0].args[0], 45 * 256);
    }
}
