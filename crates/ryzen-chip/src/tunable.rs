//! Tunable dispatch table.
//!
//! Each tunable is set by one SMU message whose id (and sometimes target
//! mailbox) depends on the SoC family. The whole mapping lives in [`TABLE`];
//! [`lookup`] is the only way to read it.
//!
//! Message ids below were found by tracing vendor tools and are not
//! documented publicly.

use crate::family::Family;
use crate::mailbox::EndpointKind;
use std::fmt;

/// A settable SMU parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Tunable {
    // Power limits (mW) and time constants (s)
    StapmLimit,
    FastLimit,
    SlowLimit,
    SlowTime,
    StapmTime,
    ApuSlowLimit,
    SkinTempPowerLimit,
    // Temperature (°C)
    TctlTemp,
    ApuSkinTempLimit,
    DgpuSkinTempLimit,
    // Current limits (mA)
    VrmCurrent,
    VrmSocCurrent,
    VrmGfxCurrent,
    VrmCvipCurrent,
    VrmMaxCurrent,
    VrmGfxMaxCurrent,
    VrmSocMaxCurrent,
    Psi0Current,
    Psi3CpuCurrent,
    Psi0SocCurrent,
    Psi3GfxCurrent,
    // Clock bounds (MHz)
    MaxGfxclkFreq,
    MinGfxclkFreq,
    MaxSocclkFreq,
    MinSocclkFreq,
    MaxFclkFreq,
    MinFclkFreq,
    MaxVcn,
    MinVcn,
    MaxLclk,
    MinLclk,
    GfxClk,
    // Misc
    ProchotDeassertionRamp,
    OcClk,
    PerCoreOcClk,
    OcVolt,
    EnableOc,
    DisableOc,
    PowerSaving,
    MaxPerformance,
    // Curve optimizer
    CoAll,
    CoPer,
    CoGfx,
}

impl Tunable {
    /// Every tunable, in table order.
    pub const ALL: [Self; 43] = [
        Self::StapmLimit,
        Self::FastLimit,
        Self::SlowLimit,
        Self::SlowTime,
        Self::StapmTime,
        Self::ApuSlowLimit,
        Self::SkinTempPowerLimit,
        Self::TctlTemp,
        Self::ApuSkinTempLimit,
        Self::DgpuSkinTempLimit,
        Self::VrmCurrent,
        Self::VrmSocCurrent,
        Self::VrmGfxCurrent,
        Self::VrmCvipCurrent,
        Self::VrmMaxCurrent,
        Self::VrmGfxMaxCurrent,
        Self::VrmSocMaxCurrent,
        Self::Psi0Current,
        Self::Psi3CpuCurrent,
        Self::Psi0SocCurrent,
        Self::Psi3GfxCurrent,
        Self::MaxGfxclkFreq,
        Self::MinGfxclkFreq,
        Self::MaxSocclkFreq,
        Self::MinSocclkFreq,
        Self::MaxFclkFreq,
        Self::MinFclkFreq,
        Self::MaxVcn,
        Self::MinVcn,
        Self::MaxLclk,
        Self::MinLclk,
        Self::GfxClk,
        Self::ProchotDeassertionRamp,
        Self::OcClk,
        Self::PerCoreOcClk,
        Self::OcVolt,
        Self::EnableOc,
        Self::DisableOc,
        Self::PowerSaving,
        Self::MaxPerformance,
        Self::CoAll,
        Self::CoPer,
        Self::CoGfx,
    ];

    /// snake_case name, as used on the command line and in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::StapmLimit => "stapm_limit",
            Self::FastLimit => "fast_limit",
            Self::SlowLimit => "slow_limit",
            Self::SlowTime => "slow_time",
            Self::StapmTime => "stapm_time",
            Self::ApuSlowLimit => "apu_slow_limit",
            Self::SkinTempPowerLimit => "skin_temp_power_limit",
            Self::TctlTemp => "tctl_temp",
            Self::ApuSkinTempLimit => "apu_skin_temp_limit",
            Self::DgpuSkinTempLimit => "dgpu_skin_temp_limit",
            Self::VrmCurrent => "vrm_current",
            Self::VrmSocCurrent => "vrmsoc_current",
            Self::VrmGfxCurrent => "vrmgfx_current",
            Self::VrmCvipCurrent => "vrmcvip_current",
            Self::VrmMaxCurrent => "vrmmax_current",
            Self::VrmGfxMaxCurrent => "vrmgfxmax_current",
            Self::VrmSocMaxCurrent => "vrmsocmax_current",
            Self::Psi0Current => "psi0_current",
            Self::Psi3CpuCurrent => "psi3cpu_current",
            Self::Psi0SocCurrent => "psi0soc_current",
            Self::Psi3GfxCurrent => "psi3gfx_current",
            Self::MaxGfxclkFreq => "max_gfxclk_frequency",
            Self::MinGfxclkFreq => "min_gfxclk_frequency",
            Self::MaxSocclkFreq => "max_socclk_frequency",
            Self::MinSocclkFreq => "min_socclk_frequency",
            Self::MaxFclkFreq => "max_fclk_frequency",
            Self::MinFclkFreq => "min_fclk_frequency",
            Self::MaxVcn => "max_vcn",
            Self::MinVcn => "min_vcn",
            Self::MaxLclk => "max_lclk",
            Self::MinLclk => "min_lclk",
            Self::GfxClk => "gfx_clk",
            Self::ProchotDeassertionRamp => "prochot_deassertion_ramp",
            Self::OcClk => "oc_clk",
            Self::PerCoreOcClk => "per_core_oc_clk",
            Self::OcVolt => "oc_volt",
            Self::EnableOc => "enable_oc",
            Self::DisableOc => "disable_oc",
            Self::PowerSaving => "power_saving",
            Self::MaxPerformance => "max_performance",
            Self::CoAll => "coall",
            Self::CoPer => "coper",
            Self::CoGfx => "cogfx",
        }
    }
}

impl fmt::Display for Tunable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Target mailbox and message id for one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Route {
    /// Mailbox the message is sent to.
    pub endpoint: EndpointKind,
    /// Message id.
    pub message: u32,
}

impl Route {
    /// MP1 route.
    #[must_use]
    pub const fn mp1(message: u32) -> Self {
        Self {
            endpoint: EndpointKind::Mp1,
            message,
        }
    }

    /// PSMU route.
    #[must_use]
    pub const fn psmu(message: u32) -> Self {
        Self {
            endpoint: EndpointKind::Psmu,
            message,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:#04x}", self.endpoint, self.message)
    }
}

/// How the caller's value is placed into arg0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// arg0 = value.
    Raw,
    /// arg0 = value × 256 (8.8 fixed point, skin temperature limits).
    FixedPoint8,
    /// Value ignored, arg0 = 0.
    Trigger,
}

impl Encoding {
    /// Encode `value` as arg0.
    #[must_use]
    pub const fn encode(self, value: u32) -> u32 {
        match self {
            Self::Raw => value,
            Self::FixedPoint8 => value.saturating_mul(256),
            Self::Trigger => 0,
        }
    }
}

/// One dispatch row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TunableRow {
    /// Parameter being set.
    pub tunable: Tunable,
    /// Families this row applies to.
    pub families: &'static [Family],
    /// First attempt.
    pub primary: Route,
    /// Second attempt when the first is refused by firmware.
    pub fallback: Option<Route>,
    /// Argument encoding.
    pub encoding: Encoding,
}

impl TunableRow {
    /// `true` when this row covers `family`.
    #[must_use]
    pub fn applies_to(&self, family: Family) -> bool {
        self.families.contains(&family)
    }
}

// ── Family groups ────────────────────────────────────────────────────────────

use Family::{
    Cezanne, Dali, DragonRange, FireRange, HawkPoint, KrackanPoint, Lucienne, Mendocino, Phoenix,
    Picasso, Raven, Rembrandt, Renoir, StrixHalo, StrixPoint, Vangogh,
};

const RAVEN_CLASS: &[Family] = &[Raven, Picasso, Dali];
const RENOIR_CLASS: &[Family] = &[Renoir, Lucienne, Cezanne];
const DESKTOP_CLASS: &[Family] = &[DragonRange, FireRange];
const VANGOGH: &[Family] = &[Vangogh];
const CEZANNE: &[Family] = &[Cezanne];
const RENOIR: &[Family] = &[Renoir];

/// Rembrandt and everything newer on the mobile side.
const REMBRANDT_CLASS: &[Family] = &[
    Rembrandt,
    Mendocino,
    Phoenix,
    HawkPoint,
    KrackanPoint,
    StrixPoint,
    StrixHalo,
];

/// Every mobile family from Vangogh on.
const MODERN_MOBILE: &[Family] = &[
    Vangogh,
    Rembrandt,
    Mendocino,
    Phoenix,
    HawkPoint,
    KrackanPoint,
    StrixPoint,
    StrixHalo,
];

/// Renoir and newer mobile parts.
const RENOIR_PLUS: &[Family] = &[
    Renoir,
    Lucienne,
    Cezanne,
    Vangogh,
    Rembrandt,
    Mendocino,
    Phoenix,
    HawkPoint,
    KrackanPoint,
    StrixPoint,
    StrixHalo,
];

/// [`RENOIR_PLUS`] minus Vangogh, whose firmware reuses 0x1C..0x1F for GFX/CVIP rails.
const RENOIR_PLUS_NO_VANGOGH: &[Family] = &[
    Renoir,
    Lucienne,
    Cezanne,
    Rembrandt,
    Mendocino,
    Phoenix,
    HawkPoint,
    KrackanPoint,
    StrixPoint,
    StrixHalo,
];

/// Renoir through Hawk Point, excluding the handheld and low-end parts.
const OC_CAPABLE: &[Family] = &[Renoir, Lucienne, Cezanne, Rembrandt, Phoenix, HawkPoint];

const fn row(tunable: Tunable, families: &'static [Family], primary: Route) -> TunableRow {
    TunableRow {
        tunable,
        families,
        primary,
        fallback: None,
        encoding: Encoding::Raw,
    }
}

const fn with_fallback(mut r: TunableRow, fallback: Route) -> TunableRow {
    r.fallback = Some(fallback);
    r
}

const fn encoded(mut r: TunableRow, encoding: Encoding) -> TunableRow {
    r.encoding = encoding;
    r
}

const fn trigger(tunable: Tunable, families: &'static [Family], primary: Route) -> TunableRow {
    encoded(row(tunable, families, primary), Encoding::Trigger)
}

use Route as R;
use Tunable as T;

/// The dispatch table. At most one row per `(tunable, family)`.
pub static TABLE: &[TunableRow] = &[
    // ── Power limits ─────────────────────────────────────────────────────────
    row(T::StapmLimit, RAVEN_CLASS, R::mp1(0x1A)),
    with_fallback(row(T::StapmLimit, RENOIR_CLASS, R::mp1(0x14)), R::psmu(0x31)),
    row(T::StapmLimit, MODERN_MOBILE, R::mp1(0x14)),
    row(T::StapmLimit, DESKTOP_CLASS, R::psmu(0x56)),
    row(T::FastLimit, RAVEN_CLASS, R::mp1(0x1B)),
    row(T::FastLimit, RENOIR_PLUS, R::mp1(0x15)),
    row(T::FastLimit, DESKTOP_CLASS, R::psmu(0x56)),
    row(T::SlowLimit, RAVEN_CLASS, R::mp1(0x1C)),
    row(T::SlowLimit, RENOIR_PLUS, R::mp1(0x16)),
    row(T::SlowLimit, DESKTOP_CLASS, R::psmu(0x56)),
    row(T::SlowTime, RAVEN_CLASS, R::mp1(0x1D)),
    row(T::SlowTime, RENOIR_PLUS, R::mp1(0x17)),
    row(T::StapmTime, RAVEN_CLASS, R::mp1(0x1E)),
    row(T::StapmTime, RENOIR_PLUS, R::mp1(0x18)),
    row(T::ApuSlowLimit, RENOIR_PLUS, R::mp1(0x23)),
    row(T::SkinTempPowerLimit, RENOIR_PLUS, R::mp1(0x53)),
    // ── Temperature ──────────────────────────────────────────────────────────
    row(T::TctlTemp, RAVEN_CLASS, R::mp1(0x1F)),
    row(T::TctlTemp, RENOIR_PLUS, R::mp1(0x19)),
    row(T::TctlTemp, DESKTOP_CLASS, R::psmu(0x59)),
    encoded(
        row(T::ApuSkinTempLimit, RENOIR_PLUS, R::mp1(0x38)),
        Encoding::FixedPoint8,
    ),
    encoded(
        row(T::DgpuSkinTempLimit, RENOIR_PLUS, R::mp1(0x37)),
        Encoding::FixedPoint8,
    ),
    // ── Current limits ───────────────────────────────────────────────────────
    row(T::VrmCurrent, RAVEN_CLASS, R::mp1(0x20)),
    row(T::VrmCurrent, RENOIR_PLUS, R::mp1(0x1A)),
    row(T::VrmCurrent, DESKTOP_CLASS, R::psmu(0x58)),
    row(T::VrmSocCurrent, RAVEN_CLASS, R::mp1(0x21)),
    row(T::VrmSocCurrent, RENOIR_PLUS, R::mp1(0x1B)),
    row(T::VrmGfxCurrent, VANGOGH, R::mp1(0x1C)),
    row(T::VrmCvipCurrent, VANGOGH, R::mp1(0x1D)),
    row(T::VrmMaxCurrent, RAVEN_CLASS, R::mp1(0x22)),
    row(T::VrmMaxCurrent, RENOIR_PLUS_NO_VANGOGH, R::mp1(0x1C)),
    row(T::VrmMaxCurrent, VANGOGH, R::mp1(0x1E)),
    row(T::VrmMaxCurrent, DESKTOP_CLASS, R::psmu(0x57)),
    row(T::VrmGfxMaxCurrent, VANGOGH, R::mp1(0x1F)),
    row(T::VrmSocMaxCurrent, RAVEN_CLASS, R::mp1(0x23)),
    row(T::VrmSocMaxCurrent, RENOIR_PLUS_NO_VANGOGH, R::mp1(0x1D)),
    row(T::Psi0Current, RAVEN_CLASS, R::mp1(0x24)),
    row(T::Psi0Current, RENOIR_PLUS_NO_VANGOGH, R::mp1(0x1E)),
    row(T::Psi3CpuCurrent, RENOIR_PLUS_NO_VANGOGH, R::mp1(0x1F)),
    row(T::Psi0SocCurrent, RAVEN_CLASS, R::mp1(0x25)),
    row(T::Psi0SocCurrent, RENOIR_PLUS, R::mp1(0x21)),
    row(T::Psi3GfxCurrent, RENOIR_PLUS, R::mp1(0x20)),
    // ── Clock bounds ─────────────────────────────────────────────────────────
    row(T::MaxGfxclkFreq, RAVEN_CLASS, R::mp1(0x46)),
    row(T::MinGfxclkFreq, RAVEN_CLASS, R::mp1(0x47)),
    row(T::MaxSocclkFreq, RAVEN_CLASS, R::mp1(0x48)),
    row(T::MinSocclkFreq, RAVEN_CLASS, R::mp1(0x49)),
    row(T::MaxFclkFreq, RAVEN_CLASS, R::mp1(0x4A)),
    row(T::MinFclkFreq, RAVEN_CLASS, R::mp1(0x4B)),
    row(T::MaxVcn, RAVEN_CLASS, R::mp1(0x4C)),
    row(T::MinVcn, RAVEN_CLASS, R::mp1(0x4D)),
    row(T::MaxLclk, RAVEN_CLASS, R::mp1(0x4E)),
    row(T::MinLclk, RAVEN_CLASS, R::mp1(0x4F)),
    row(T::GfxClk, RENOIR, R::psmu(0x89)),
    // ── Misc ─────────────────────────────────────────────────────────────────
    row(T::ProchotDeassertionRamp, RAVEN_CLASS, R::mp1(0x26)),
    row(T::ProchotDeassertionRamp, RENOIR_PLUS, R::mp1(0x22)),
    row(T::OcClk, RAVEN_CLASS, R::psmu(0x7D)),
    row(T::OcClk, OC_CAPABLE, R::psmu(0x19)),
    row(T::PerCoreOcClk, RAVEN_CLASS, R::psmu(0x7E)),
    row(T::PerCoreOcClk, OC_CAPABLE, R::psmu(0x1A)),
    row(T::OcVolt, RAVEN_CLASS, R::psmu(0x7F)),
    row(T::OcVolt, OC_CAPABLE, R::psmu(0x1B)),
    trigger(T::EnableOc, RAVEN_CLASS, R::psmu(0x69)),
    trigger(T::EnableOc, OC_CAPABLE, R::psmu(0x17)),
    trigger(T::DisableOc, RAVEN_CLASS, R::psmu(0x6A)),
    trigger(T::DisableOc, OC_CAPABLE, R::psmu(0x18)),
    trigger(T::PowerSaving, RAVEN_CLASS, R::mp1(0x19)),
    trigger(T::PowerSaving, RENOIR_PLUS, R::mp1(0x12)),
    trigger(T::MaxPerformance, RAVEN_CLASS, R::mp1(0x18)),
    trigger(T::MaxPerformance, RENOIR_PLUS, R::mp1(0x11)),
    // ── Curve optimizer ──────────────────────────────────────────────────────
    row(T::CoAll, RENOIR_CLASS, R::psmu(0x5D)),
    row(T::CoAll, REMBRANDT_CLASS, R::mp1(0x4C)),
    row(T::CoPer, CEZANNE, R::psmu(0x54)),
    row(T::CoPer, REMBRANDT_CLASS, R::mp1(0x4B)),
    row(T::CoGfx, RENOIR_CLASS, R::psmu(0xB7)),
];

/// Find the row for `(tunable, family)`.
#[must_use]
pub fn lookup(tunable: Tunable, family: Family) -> Option<&'static TunableRow> {
    TABLE
        .iter()
        .find(|r| r.tunable == tunable && r.applies_to(family))
}

/// Families with at least one row for `tunable`.
pub fn supported_families(tunable: Tunable) -> impl Iterator<Item = Family> {
    Family::ALL
        .into_iter()
        .filter(move |&family| lookup(tunable, family).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renoir_stapm_falls_back_to_psmu() {
        let r = lookup(Tunable::StapmLimit, Family::Renoir).unwrap();
        assert_eq!(r.primary, Route::mp1(0x14));
        assert_eq!(r.fallback, Some(Route::psmu(0x31)));
        assert_eq!(r.encoding.encode(15_000), 15_000);
    }

    #[test]
    fn raven_uses_legacy_ids() {
        assert_eq!(lookup(Tunable::StapmLimit, Family::Raven).unwrap().primary, R::mp1(0x1A));
        assert_eq!(lookup(Tunable::MinLclk, Family::Dali).unwrap().primary, R::mp1(0x4F));
        assert!(lookup(Tunable::MaxGfxclkFreq, Family::Renoir).is_none());
    }

    #[test]
    fn at_most_one_row_per_family() {
        for tunable in Tunable::ALL {
            for family in Family::ALL {
                let n = TABLE
                    .iter()
                    .filter(|r| r.tunable == tunable && r.applies_to(family))
                    .count();
                assert!(n <= 1, "{tunable} has {n} rows for {family}");
            }
        }
    }

    #[test]
    fn every_tunable_is_reachable() {
        for tunable in Tunable::ALL {
            assert!(
                supported_families(tunable).next().is_some(),
                "{tunable} has no rows"
            );
        }
    }

    #[test]
    fn unknown_family_has_no_rows() {
        for tunable in Tunable::ALL {
            assert!(lookup(tunable, Family::Unknown).is_none());
        }
    }

    #[test]
    fn skin_temperature_is_fixed_point() {
        let r = lookup(Tunable::ApuSkinTempLimit, Family::Phoenix).unwrap();
        assert_eq!(r.encoding, Encoding::FixedPoint8);
        assert_eq!(r.encoding.encode(45), 45 * 256);
        assert!(lookup(Tunable::ApuSkinTempLimit, Family::DragonRange).is_none());
    }

    #[test]
    fn triggers_send_zero() {
        for t in [Tunable::PowerSaving, Tunable::MaxPerformance, Tunable::EnableOc] {
            let r = lookup(t, Family::Cezanne).unwrap();
            assert_eq!(r.encoding.encode(1234), 0, "{t}");
        }
    }

    #[test]
    fn vangogh_rails() {
        assert_eq!(lookup(Tunable::VrmGfxCurrent, Family::Vangogh).unwrap().primary, R::mp1(0x1C));
        assert_eq!(lookup(Tunable::VrmMaxCurrent, Family::Vangogh).unwrap().primary, R::mp1(0x1E));
        assert_eq!(lookup(Tunable::VrmMaxCurrent, Family::Phoenix).unwrap().primary, R::mp1(0x1C));
    }

    /// Message ids as documented by the firmware interface, written out by hand
    /// so a typo in `TABLE` cannot hide behind itself.
    const DOCUMENTED: &[(Family, Tunable, EndpointKind, u32)] = &[
        (Raven, T::StapmLimit, EndpointKind::Mp1, 0x1A),
        (Raven, T::FastLimit, EndpointKind::Mp1, 0x1B),
        (Raven, T::SlowLimit, EndpointKind::Mp1, 0x1C),
        (Raven, T::TctlTemp, EndpointKind::Mp1, 0x1F),
        (Raven, T::VrmCurrent, EndpointKind::Mp1, 0x20),
        (Picasso, T::VrmMaxCurrent, EndpointKind::Mp1, 0x22),
        (Dali, T::SlowTime, EndpointKind::Mp1, 0x1D),
        (Renoir, T::StapmLimit, EndpointKind::Mp1, 0x14),
        (Renoir, T::FastLimit, EndpointKind::Mp1, 0x15),
        (Renoir, T::SlowLimit, EndpointKind::Mp1, 0x16),
        (Renoir, T::TctlTemp, EndpointKind::Mp1, 0x19),
        (Renoir, T::VrmCurrent, EndpointKind::Mp1, 0x1A),
        (Cezanne, T::VrmMaxCurrent, EndpointKind::Mp1, 0x1C),
        (Cezanne, T::CoAll, EndpointKind::Psmu, 0x5D),
        (Cezanne, T::CoPer, EndpointKind::Psmu, 0x54),
        (Lucienne, T::CoGfx, EndpointKind::Psmu, 0xB7),
        (Vangogh, T::StapmLimit, EndpointKind::Mp1, 0x14),
        (Vangogh, T::FastLimit, EndpointKind::Mp1, 0x15),
        (Vangogh, T::SlowLimit, EndpointKind::Mp1, 0x16),
        (Vangogh, T::TctlTemp, EndpointKind::Mp1, 0x19),
        (Vangogh, T::VrmCurrent, EndpointKind::Mp1, 0x1A),
        (Vangogh, T::VrmMaxCurrent, EndpointKind::Mp1, 0x1E),
        (Rembrandt, T::StapmLimit, EndpointKind::Mp1, 0x14),
        (Rembrandt, T::CoAll, EndpointKind::Mp1, 0x4C),
        (Rembrandt, T::CoPer, EndpointKind::Mp1, 0x4B),
        (Phoenix, T::FastLimit, EndpointKind::Mp1, 0x15),
        (Phoenix, T::SlowLimit, EndpointKind::Mp1, 0x16),
        (Phoenix, T::TctlTemp, EndpointKind::Mp1, 0x19),
        (Phoenix, T::VrmCurrent, EndpointKind::Mp1, 0x1A),
        (StrixPoint, T::CoAll, EndpointKind::Mp1, 0x4C),
        (DragonRange, T::StapmLimit, EndpointKind::Psmu, 0x56),
        (DragonRange, T::FastLimit, EndpointKind::Psmu, 0x56),
        (DragonRange, T::SlowLimit, EndpointKind::Psmu, 0x56),
        (DragonRange, T::TctlTemp, EndpointKind::Psmu, 0x59),
        (FireRange, T::VrmCurrent, EndpointKind::Psmu, 0x58),
        (FireRange, T::VrmMaxCurrent, EndpointKind::Psmu, 0x57),
    ];

    #[test]
    fn documented_message_ids() {
        for &(family, tunable, endpoint, message) in DOCUMENTED {
            let r = lookup(tunable, family)
                .unwrap_or_else(|| panic!("{tunable} missing for {family}"));
            assert_eq!(r.primary.endpoint, endpoint, "{tunable} on {family}");
            assert_eq!(r.primary.message, message, "{tunable} on {family}");
        }
    }

    #[test]
    fn only_renoir_class_stapm_has_a_fallback() {
        for family in [Renoir, Lucienne, Cezanne] {
            let r = lookup(T::StapmLimit, family).unwrap();
            assert_eq!(r.fallback, Some(R::psmu(0x31)), "{family}");
        }
        for family in [Raven, Vangogh, Rembrandt, Phoenix, DragonRange] {
            assert_eq!(lookup(T::StapmLimit, family).unwrap().fallback, None, "{family}");
        }
    }

    #[test]
    fn curve_optimizer_gaps() {
        assert!(lookup(T::CoPer, Renoir).is_none());
        assert!(lookup(T::CoGfx, Phoenix).is_none());
        assert!(lookup(T::CoAll, Vangogh).is_none());
        assert!(lookup(T::CoAll, DragonRange).is_none());
    }

    #[test]
    fn curve_optimizer_names_match_the_rest() {
        assert_eq!(T::CoAll.to_string(), "coall");
        assert_eq!(T::CoPer.name(), "coper");
        assert_eq!(T::CoGfx.name(), "cogfx");
        for t in Tunable::ALL {
            assert!(!t.name().starts_with("set_"), "{t}");
        }
    }

    #[test]
    fn names_are_unique() {
        let mut names: Vec<_> = Tunable::ALL.iter().map(|t| t.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Tunable::ALL.len());
    }
}
