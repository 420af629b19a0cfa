//! PM table metric getters
//!
//! All getters read the last good snapshot and never touch the SMU; call
//! [`Session::refresh_table`] first. A metric the table version does not
//! carry, or a table that was never populated, reads as NaN.

use crate::session::Session;
use ryzen_chip::pm_table::{self, CoreMetric, Metric};

impl Session {
    /// Value of `metric` in the cached table
    pub fn metric(&self, metric: Metric) -> f32 {
        self.table.as_ref().map_or(f32::NAN, |table| {
            pm_table::offset(table.version(), metric).map_or(f32::NAN, |off| table.read_f32(off))
        })
    }

    /// Value of `metric` for `core` in the cached table
    pub fn core_metric(&self, metric: CoreMetric, core: usize) -> f32 {
        self.table.as_ref().map_or(f32::NAN, |table| {
            pm_table::core_offset(table.version(), metric, core)
                .map_or(f32::NAN, |off| table.read_f32(off))
        })
    }

    /// Per-core slots in the cached table's layout (0 before `init_table`)
    pub fn core_count(&self) -> usize {
        self.table
            .as_ref()
            .map_or(0, |table| pm_table::core_count(table.version()))
    }

    /// Clock of `core`, as reported (GHz on Raven-generation tables, MHz otherwise)
    pub fn core_clk(&self, core: usize) -> f32 {
        self.core_metric(CoreMetric::Clock, core)
    }

    /// Voltage of `core`
    pub fn core_volt(&self, core: usize) -> f32 {
        self.core_metric(CoreMetric::Voltage, core)
    }

    /// Power of `core`
    pub fn core_power(&self, core: usize) -> f32 {
        self.core_metric(CoreMetric::Power, core)
    }

    /// Temperature of `core`
    pub fn core_temp(&self, core: usize) -> f32 {
        self.core_metric(CoreMetric::Temperature, core)
    }
}

macro_rules! getters {
    ($($name:ident => $metric:ident),* $(,)?) => {
        impl Session {
            $(
                #[doc = concat!("Cached `Metric::", stringify!($metric), "`, NaN if absent.")]
                pub fn $name(&self) -> f32 {
                    self.metric(Metric::$metric)
                }
            )*
        }
    };
}

getters! {
    stapm_limit => StapmLimit,
    stapm_value => StapmValue,
    fast_limit => FastLimit,
    fast_value => FastValue,
    slow_limit => SlowLimit,
    slow_value => SlowValue,
    apu_slow_limit => ApuSlowLimit,
    apu_slow_value => ApuSlowValue,
    vrm_current => VrmCurrent,
    vrm_current_value => VrmCurrentValue,
    vrmsoc_current => VrmSocCurrent,
    vrmsoc_current_value => VrmSocCurrentValue,
    vrmmax_current => VrmMaxCurrent,
    vrmmax_current_value => VrmMaxCurrentValue,
    vrmsocmax_current => VrmSocMaxCurrent,
    vrmsocmax_current_value => VrmSocMaxCurrentValue,
    tctl_temp => TctlTemp,
    tctl_temp_value => TctlTempValue,
    apu_skin_temp_limit => ApuSkinTemp,
    apu_skin_temp_value => ApuSkinTempValue,
    dgpu_skin_temp_limit => DgpuSkinTemp,
    dgpu_skin_temp_value => DgpuSkinTempValue,
    psi0_current => Psi0Current,
    psi0soc_current => Psi0SocCurrent,
    stapm_time => StapmTime,
    slow_time => SlowTime,
    cclk_setpoint => CclkSetpoint,
    cclk_busy_value => CclkBusyValue,
    l3_clk => L3Clk,
    l3_logic => L3Logic,
    l3_vddm => L3Vddm,
    l3_temp => L3Temp,
    gfx_clk => GfxClk,
    gfx_temp => GfxTemp,
    gfx_volt => GfxVolt,
    mem_clk => MemClk,
    fclk => Fclk,
    soc_power => SocPower,
    soc_volt => SocVolt,
    socket_power => SocketPower,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::SimulatedBackend;
    use crate::config::SessionConfig;
    use ryzen_chip::Family;

    fn open(sim: &SimulatedBackend) -> Session {
        Session::with_backend(Box::new(sim.clone()), &SessionConfig::default()).unwrap()
    }

    #[test]
    fn everything_is_nan_before_init() {
        let sim = SimulatedBackend::new(Family::Renoir);
        let session = open(&sim);
        assert!(session.stapm_limit().is_nan());
        assert!(session.core_clk(0).is_nan());
        assert_eq!(session.core_count(), 0);
    }

    #[test]
    fn renoir_tctl_reads_its_slot() {
        let sim = SimulatedBackend::new(Family::Renoir);
        sim.set_table_f32(0x40, 95.0);
        let mut session = open(&sim);
        session.init_table().unwrap();

        assert!((session.tctl_temp() - 95.0).abs() < f32::EPSILON);
        // Synthetic table: slot i holds i + 1
        assert!((session.stapm_limit() - 1.0).abs() < f32::EPSILON);
        assert!((session.slow_value() - 6.0).abs() < f32::EPSILON);
        assert_eq!(session.core_count(), 8);
        assert!(!session.core_clk(7).is_nan());
        assert!(session.core_clk(8).is_nan());
    }

    #[test]
    fn missing_fields_are_nan() {
        let sim = SimulatedBackend::new(Family::DragonRange);
        let mut session = open(&sim);
        session.init_table().unwrap();
        assert!(session.apu_skin_temp_value().is_nan());
        assert!(!session.stapm_value().is_nan());
    }

    #[test]
    fn unknown_version_has_only_leading_fields() {
        let sim = SimulatedBackend::new(Family::Rembrandt).with_table_version(0x0099_9999);
        let mut session = open(&sim);
        session.init_table().unwrap();
        assert_eq!(session.table_size(), Some(0x1000));
        assert!(!session.fast_limit().is_nan());
        assert!(session.tctl_temp().is_nan());
        assert_eq!(session.core_count(), 0);
    }
}
