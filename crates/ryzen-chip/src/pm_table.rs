//! PM table layouts.
//!
//! The SMU publishes its telemetry as a flat array of little-endian `f32`
//! values. Both the array length and the meaning of each slot change with
//! the table version the firmware reports. Layouts below are grouped by SoC
//! generation; each known version points at one of them.
//!
//! ```text
//! offset  field          every version
//! 0x00    STAPM limit    ✓
//! 0x04    STAPM value    ✓
//! 0x08    PPT fast limit ✓
//! 0x0C    PPT fast value ✓
//! 0x10    PPT slow limit ✓
//! 0x14    PPT slow value ✓
//! ```
//!
//! Everything past 0x14 is version specific. A metric missing from a layout
//! means the table does not carry it, not that it reads zero.

use std::fmt;

/// Table size used for versions not listed in [`KNOWN_TABLES`].
///
/// Larger than every known table so unknown firmware is never under-read.
pub const FALLBACK_TABLE_SIZE: usize = 0x1000;

/// A scalar PM table field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Metric {
    // Leading fields
    StapmLimit,
    StapmValue,
    FastLimit,
    FastValue,
    SlowLimit,
    SlowValue,
    // Limits and their live values
    ApuSlowLimit,
    ApuSlowValue,
    VrmCurrent,
    VrmCurrentValue,
    VrmSocCurrent,
    VrmSocCurrentValue,
    VrmMaxCurrent,
    VrmMaxCurrentValue,
    VrmSocMaxCurrent,
    VrmSocMaxCurrentValue,
    TctlTemp,
    TctlTempValue,
    ApuSkinTemp,
    ApuSkinTempValue,
    DgpuSkinTemp,
    DgpuSkinTempValue,
    // Other scalars
    Psi0Current,
    Psi0SocCurrent,
    StapmTime,
    SlowTime,
    CclkSetpoint,
    CclkBusyValue,
    L3Clk,
    L3Logic,
    L3Vddm,
    L3Temp,
    GfxClk,
    GfxTemp,
    GfxVolt,
    MemClk,
    Fclk,
    SocPower,
    SocVolt,
    SocketPower,
}

impl Metric {
    /// Version-independent fields, in table order.
    pub const LEADING: [Self; 6] = [
        Self::StapmLimit,
        Self::StapmValue,
        Self::FastLimit,
        Self::FastValue,
        Self::SlowLimit,
        Self::SlowValue,
    ];

    /// Every scalar metric.
    pub const ALL: [Self; 40] = [
        Self::StapmLimit,
        Self::StapmValue,
        Self::FastLimit,
        Self::FastValue,
        Self::SlowLimit,
        Self::SlowValue,
        Self::ApuSlowLimit,
        Self::ApuSlowValue,
        Self::VrmCurrent,
        Self::VrmCurrentValue,
        Self::VrmSocCurrent,
        Self::VrmSocCurrentValue,
        Self::VrmMaxCurrent,
        Self::VrmMaxCurrentValue,
        Self::VrmSocMaxCurrent,
        Self::VrmSocMaxCurrentValue,
        Self::TctlTemp,
        Self::TctlTempValue,
        Self::ApuSkinTemp,
        Self::ApuSkinTempValue,
        Self::DgpuSkinTemp,
        Self::DgpuSkinTempValue,
        Self::Psi0Current,
        Self::Psi0SocCurrent,
        Self::StapmTime,
        Self::SlowTime,
        Self::CclkSetpoint,
        Self::CclkBusyValue,
        Self::L3Clk,
        Self::L3Logic,
        Self::L3Vddm,
        Self::L3Temp,
        Self::GfxClk,
        Self::GfxTemp,
        Self::GfxVolt,
        Self::MemClk,
        Self::Fclk,
        Self::SocPower,
        Self::SocVolt,
        Self::SocketPower,
    ];

    /// snake_case name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::StapmLimit => "stapm_limit",
            Self::StapmValue => "stapm_value",
            Self::FastLimit => "fast_limit",
            Self::FastValue => "fast_value",
            Self::SlowLimit => "slow_limit",
            Self::SlowValue => "slow_value",
            Self::ApuSlowLimit => "apu_slow_limit",
            Self::ApuSlowValue => "apu_slow_value",
            Self::VrmCurrent => "vrm_current",
            Self::VrmCurrentValue => "vrm_current_value",
            Self::VrmSocCurrent => "vrmsoc_current",
            Self::VrmSocCurrentValue => "vrmsoc_current_value",
            Self::VrmMaxCurrent => "vrmmax_current",
            Self::VrmMaxCurrentValue => "vrmmax_current_value",
            Self::VrmSocMaxCurrent => "vrmsocmax_current",
            Self::VrmSocMaxCurrentValue => "vrmsocmax_current_value",
            Self::TctlTemp => "tctl_temp",
            Self::TctlTempValue => "tctl_temp_value",
            Self::ApuSkinTemp => "apu_skin_temp_limit",
            Self::ApuSkinTempValue => "apu_skin_temp_value",
            Self::DgpuSkinTemp => "dgpu_skin_temp_limit",
            Self::DgpuSkinTempValue => "dgpu_skin_temp_value",
            Self::Psi0Current => "psi0_current",
            Self::Psi0SocCurrent => "psi0soc_current",
            Self::StapmTime => "stapm_time",
            Self::SlowTime => "slow_time",
            Self::CclkSetpoint => "cclk_setpoint",
            Self::CclkBusyValue => "cclk_busy_value",
            Self::L3Clk => "l3_clk",
            Self::L3Logic => "l3_logic",
            Self::L3Vddm => "l3_vddm",
            Self::L3Temp => "l3_temp",
            Self::GfxClk => "gfx_clk",
            Self::GfxTemp => "gfx_temp",
            Self::GfxVolt => "gfx_volt",
            Self::MemClk => "mem_clk",
            Self::Fclk => "fclk",
            Self::SocPower => "soc_power",
            Self::SocVolt => "soc_volt",
            Self::SocketPower => "socket_power",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A per-core PM table field. Stored as one `f32` per core, contiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum CoreMetric {
    Power,
    Voltage,
    Temperature,
    Clock,
}

impl CoreMetric {
    /// Every per-core metric.
    pub const ALL: [Self; 4] = [Self::Power, Self::Voltage, Self::Temperature, Self::Clock];

    /// snake_case name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Power => "core_power",
            Self::Voltage => "core_volt",
            Self::Temperature => "core_temp",
            Self::Clock => "core_clk",
        }
    }
}

impl fmt::Display for CoreMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Field placement for one generation of PM tables.
#[derive(Debug, PartialEq, Eq)]
pub struct Layout {
    /// Generation name, for diagnostics.
    pub name: &'static str,
    /// Scalar fields past the six leading ones.
    pub fields: &'static [(Metric, usize)],
    /// Number of per-core slots in each core block.
    pub cores: usize,
    /// Base offset of each per-core block.
    pub core_blocks: &'static [(CoreMetric, usize)],
}

/// A firmware table version this crate knows the size and layout of.
#[derive(Debug, PartialEq, Eq)]
pub struct KnownTable {
    /// Version reported by the SMU.
    pub version: u32,
    /// Size in bytes.
    pub size: usize,
    /// Field placement.
    pub layout: &'static Layout,
}

const LEADING_OFFSETS: [(Metric, usize); 6] = [
    (Metric::StapmLimit, 0x00),
    (Metric::StapmValue, 0x04),
    (Metric::FastLimit, 0x08),
    (Metric::FastValue, 0x0C),
    (Metric::SlowLimit, 0x10),
    (Metric::SlowValue, 0x14),
];

// ── Layouts ──────────────────────────────────────────────────────────────────

use CoreMetric as C;
use Metric as M;

/// Raven, Picasso and Dali (`0x1E00xx`). Core clocks are in GHz.
pub static RAVEN: Layout = Layout {
    name: "Raven",
    fields: &[
        (M::VrmCurrent, 0x18),
        (M::VrmCurrentValue, 0x1C),
        (M::VrmSocCurrent, 0x20),
        (M::VrmSocCurrentValue, 0x24),
        (M::VrmMaxCurrent, 0x28),
        (M::VrmMaxCurrentValue, 0x2C),
        (M::VrmSocMaxCurrent, 0x30),
        (M::VrmSocMaxCurrentValue, 0x34),
        (M::TctlTemp, 0x38),
        (M::TctlTempValue, 0x3C),
        (M::Psi0Current, 0x40),
        (M::Psi0SocCurrent, 0x44),
        (M::StapmTime, 0x48),
        (M::SlowTime, 0x4C),
        (M::CclkSetpoint, 0x7C),
        (M::CclkBusyValue, 0x80),
        (M::SocketPower, 0x98),
        (M::SocVolt, 0xA8),
        (M::SocPower, 0xAC),
        (M::L3Clk, 0x2A0),
        (M::L3Logic, 0x2A4),
        (M::L3Vddm, 0x2A8),
        (M::L3Temp, 0x2AC),
        (M::GfxVolt, 0x2C8),
        (M::GfxTemp, 0x2CC),
        (M::GfxClk, 0x2D0),
        (M::Fclk, 0x2E8),
        (M::MemClk, 0x2EC),
    ],
    cores: 4,
    core_blocks: &[
        (C::Power, 0x240),
        (C::Voltage, 0x250),
        (C::Temperature, 0x260),
        (C::Clock, 0x288),
    ],
};

/// Renoir and Lucienne (`0x3700xx`).
pub static RENOIR: Layout = Layout {
    name: "Renoir",
    fields: &[
        (M::ApuSlowLimit, 0x18),
        (M::ApuSlowValue, 0x1C),
        (M::VrmCurrent, 0x20),
        (M::VrmCurrentValue, 0x24),
        (M::VrmSocCurrent, 0x28),
        (M::VrmSocCurrentValue, 0x2C),
        (M::VrmMaxCurrent, 0x30),
        (M::VrmMaxCurrentValue, 0x34),
        (M::VrmSocMaxCurrent, 0x38),
        (M::VrmSocMaxCurrentValue, 0x3C),
        (M::TctlTemp, 0x40),
        (M::TctlTempValue, 0x44),
        (M::ApuSkinTemp, 0x48),
        (M::ApuSkinTempValue, 0x4C),
        (M::DgpuSkinTemp, 0x50),
        (M::DgpuSkinTempValue, 0x54),
        (M::Psi0Current, 0x58),
        (M::Psi0SocCurrent, 0x5C),
        (M::StapmTime, 0x88),
        (M::SlowTime, 0x8C),
        (M::SocketPower, 0x98),
        (M::CclkSetpoint, 0x108),
        (M::CclkBusyValue, 0x10C),
        (M::SocVolt, 0x180),
        (M::SocPower, 0x184),
        (M::L3Clk, 0x3C0),
        (M::L3Logic, 0x3C4),
        (M::L3Vddm, 0x3C8),
        (M::L3Temp, 0x3CC),
        (M::GfxVolt, 0x5B4),
        (M::GfxTemp, 0x5B8),
        (M::GfxClk, 0x5BC),
        (M::Fclk, 0x5CC),
        (M::MemClk, 0x5D0),
    ],
    cores: 8,
    core_blocks: &[
        (C::Power, 0x300),
        (C::Voltage, 0x320),
        (C::Temperature, 0x340),
        (C::Clock, 0x3A0),
    ],
};

/// Cezanne (`0x4000xx`).
pub static CEZANNE: Layout = Layout {
    name: "Cezanne",
    fields: &[
        (M::ApuSlowLimit, 0x18),
        (M::ApuSlowValue, 0x1C),
        (M::VrmCurrent, 0x20),
        (M::VrmCurrentValue, 0x24),
        (M::VrmSocCurrent, 0x28),
        (M::VrmSocCurrentValue, 0x2C),
        (M::VrmMaxCurrent, 0x30),
        (M::VrmMaxCurrentValue, 0x34),
        (M::VrmSocMaxCurrent, 0x38),
        (M::VrmSocMaxCurrentValue, 0x3C),
        (M::TctlTemp, 0x40),
        (M::TctlTempValue, 0x44),
        (M::ApuSkinTemp, 0x48),
        (M::ApuSkinTempValue, 0x4C),
        (M::DgpuSkinTemp, 0x50),
        (M::DgpuSkinTempValue, 0x54),
        (M::Psi0Current, 0x58),
        (M::Psi0SocCurrent, 0x5C),
        (M::StapmTime, 0x98),
        (M::SlowTime, 0x9C),
        (M::SocketPower, 0xA8),
        (M::CclkSetpoint, 0x11C),
        (M::CclkBusyValue, 0x120),
        (M::SocVolt, 0x190),
        (M::SocPower, 0x194),
        (M::L3Clk, 0x400),
        (M::L3Logic, 0x404),
        (M::L3Vddm, 0x408),
        (M::L3Temp, 0x40C),
        (M::GfxVolt, 0x62C),
        (M::GfxTemp, 0x630),
        (M::GfxClk, 0x634),
        (M::Fclk, 0x644),
        (M::MemClk, 0x648),
    ],
    cores: 8,
    core_blocks: &[
        (C::Power, 0x320),
        (C::Voltage, 0x340),
        (C::Temperature, 0x360),
        (C::Clock, 0x3C0),
    ],
};

/// Vangogh (`0x3F00xx`). Four cores, no dGPU skin sensor.
pub static VANGOGH: Layout = Layout {
    name: "Vangogh",
    fields: &[
        (M::ApuSlowLimit, 0x18),
        (M::ApuSlowValue, 0x1C),
        (M::VrmCurrent, 0x20),
        (M::VrmCurrentValue, 0x24),
        (M::VrmSocCurrent, 0x28),
        (M::VrmSocCurrentValue, 0x2C),
        (M::VrmMaxCurrent, 0x30),
        (M::VrmMaxCurrentValue, 0x34),
        (M::VrmSocMaxCurrent, 0x38),
        (M::VrmSocMaxCurrentValue, 0x3C),
        (M::TctlTemp, 0x40),
        (M::TctlTempValue, 0x44),
        (M::ApuSkinTemp, 0x48),
        (M::ApuSkinTempValue, 0x4C),
        (M::StapmTime, 0x78),
        (M::SlowTime, 0x7C),
        (M::SocketPower, 0x98),
        (M::SocVolt, 0xB0),
        (M::SocPower, 0xB4),
        (M::L3Clk, 0x2F0),
        (M::L3Logic, 0x2F4),
        (M::L3Vddm, 0x2F8),
        (M::L3Temp, 0x2FC),
        (M::GfxVolt, 0x460),
        (M::GfxTemp, 0x464),
        (M::GfxClk, 0x468),
        (M::Fclk, 0x478),
        (M::MemClk, 0x47C),
    ],
    cores: 4,
    core_blocks: &[
        (C::Power, 0x240),
        (C::Voltage, 0x250),
        (C::Temperature, 0x260),
        (C::Clock, 0x2A0),
    ],
};

/// Rembrandt (`0x4500xx`).
pub static REMBRANDT: Layout = Layout {
    name: "Rembrandt",
    fields: &[
        (M::ApuSlowLimit, 0x18),
        (M::ApuSlowValue, 0x1C),
        (M::VrmCurrent, 0x20),
        (M::VrmCurrentValue, 0x24),
        (M::VrmSocCurrent, 0x28),
        (M::VrmSocCurrentValue, 0x2C),
        (M::VrmMaxCurrent, 0x30),
        (M::VrmMaxCurrentValue, 0x34),
        (M::VrmSocMaxCurrent, 0x38),
        (M::VrmSocMaxCurrentValue, 0x3C),
        (M::TctlTemp, 0x40),
        (M::TctlTempValue, 0x44),
        (M::ApuSkinTemp, 0x48),
        (M::ApuSkinTempValue, 0x4C),
        (M::DgpuSkinTemp, 0x50),
        (M::DgpuSkinTempValue, 0x54),
        (M::StapmTime, 0x88),
        (M::SlowTime, 0x8C),
        (M::SocketPower, 0xA8),
        (M::CclkSetpoint, 0x12C),
        (M::CclkBusyValue, 0x130),
        (M::SocVolt, 0x1A0),
        (M::SocPower, 0x1A4),
        (M::L3Clk, 0x480),
        (M::L3Logic, 0x484),
        (M::L3Vddm, 0x488),
        (M::L3Temp, 0x48C),
        (M::GfxVolt, 0x700),
        (M::GfxTemp, 0x704),
        (M::GfxClk, 0x708),
        (M::Fclk, 0x718),
        (M::MemClk, 0x71C),
    ],
    cores: 8,
    core_blocks: &[
        (C::Power, 0x380),
        (C::Voltage, 0x3A0),
        (C::Temperature, 0x3C0),
        (C::Clock, 0x420),
    ],
};

/// Phoenix and Hawk Point (`0x4C00xx`).
pub static PHOENIX: Layout = Layout {
    name: "Phoenix",
    fields: &[
        (M::ApuSlowLimit, 0x18),
        (M::ApuSlowValue, 0x1C),
        (M::VrmCurrent, 0x20),
        (M::VrmCurrentValue, 0x24),
        (M::VrmSocCurrent, 0x28),
        (M::VrmSocCurrentValue, 0x2C),
        (M::VrmMaxCurrent, 0x30),
        (M::VrmMaxCurrentValue, 0x34),
        (M::VrmSocMaxCurrent, 0x38),
        (M::VrmSocMaxCurrentValue, 0x3C),
        (M::TctlTemp, 0x40),
        (M::TctlTempValue, 0x44),
        (M::ApuSkinTemp, 0x48),
        (M::ApuSkinTempValue, 0x4C),
        (M::DgpuSkinTemp, 0x50),
        (M::DgpuSkinTempValue, 0x54),
        (M::StapmTime, 0x98),
        (M::SlowTime, 0x9C),
        (M::SocketPower, 0xA8),
        (M::SocVolt, 0x1B0),
        (M::SocPower, 0x1B4),
        (M::L3Clk, 0x4A0),
        (M::L3Logic, 0x4A4),
        (M::L3Vddm, 0x4A8),
        (M::L3Temp, 0x4AC),
        (M::GfxVolt, 0x740),
        (M::GfxTemp, 0x744),
        (M::GfxClk, 0x748),
        (M::Fclk, 0x758),
        (M::MemClk, 0x75C),
    ],
    cores: 8,
    core_blocks: &[
        (C::Power, 0x3A0),
        (C::Voltage, 0x3C0),
        (C::Temperature, 0x3E0),
        (C::Clock, 0x440),
    ],
};

/// Zen 5 APU fields shared by Strix Point and Krackan Point.
const STRIX_FIELDS: &[(Metric, usize)] = &[
    (M::ApuSlowLimit, 0x18),
    (M::ApuSlowValue, 0x1C),
    (M::VrmCurrent, 0x20),
    (M::VrmCurrentValue, 0x24),
    (M::VrmSocCurrent, 0x28),
    (M::VrmSocCurrentValue, 0x2C),
    (M::VrmMaxCurrent, 0x30),
    (M::VrmMaxCurrentValue, 0x34),
    (M::VrmSocMaxCurrent, 0x38),
    (M::VrmSocMaxCurrentValue, 0x3C),
    (M::TctlTemp, 0x40),
    (M::TctlTempValue, 0x44),
    (M::ApuSkinTemp, 0x48),
    (M::ApuSkinTempValue, 0x4C),
    (M::DgpuSkinTemp, 0x50),
    (M::DgpuSkinTempValue, 0x54),
    (M::StapmTime, 0xA8),
    (M::SlowTime, 0xAC),
    (M::SocketPower, 0xB8),
    (M::SocVolt, 0x1D0),
    (M::SocPower, 0x1D4),
    (M::L3Clk, 0x5A0),
    (M::L3Logic, 0x5A4),
    (M::L3Vddm, 0x5A8),
    (M::L3Temp, 0x5AC),
    (M::GfxVolt, 0x880),
    (M::GfxTemp, 0x884),
    (M::GfxClk, 0x888),
    (M::Fclk, 0x898),
    (M::MemClk, 0x89C),
];

/// Strix Point (`0x5D00xx`). Twelve cores.
pub static STRIX: Layout = Layout {
    name: "Strix Point",
    fields: STRIX_FIELDS,
    cores: 12,
    core_blocks: &[
        (C::Power, 0x400),
        (C::Voltage, 0x430),
        (C::Temperature, 0x460),
        (C::Clock, 0x4F0),
    ],
};

/// Krackan Point (`0x6500xx`).
pub static KRACKAN: Layout = Layout {
    name: "Krackan Point",
    fields: STRIX_FIELDS,
    cores: 8,
    core_blocks: &[
        (C::Power, 0x400),
        (C::Voltage, 0x430),
        (C::Temperature, 0x460),
        (C::Clock, 0x4F0),
    ],
};

/// Strix Halo (`0x6402xx`). Sixteen cores.
pub static STRIX_HALO: Layout = Layout {
    name: "Strix Halo",
    fields: &[
        (M::ApuSlowLimit, 0x18),
        (M::ApuSlowValue, 0x1C),
        (M::VrmCurrent, 0x20),
        (M::VrmCurrentValue, 0x24),
        (M::VrmSocCurrent, 0x28),
        (M::VrmSocCurrentValue, 0x2C),
        (M::VrmMaxCurrent, 0x30),
        (M::VrmMaxCurrentValue, 0x34),
        (M::VrmSocMaxCurrent, 0x38),
        (M::VrmSocMaxCurrentValue, 0x3C),
        (M::TctlTemp, 0x40),
        (M::TctlTempValue, 0x44),
        (M::ApuSkinTemp, 0x48),
        (M::ApuSkinTempValue, 0x4C),
        (M::StapmTime, 0xA8),
        (M::SlowTime, 0xAC),
        (M::SocketPower, 0xB8),
        (M::SocVolt, 0x1D0),
        (M::SocPower, 0x1D4),
        (M::L3Clk, 0x620),
        (M::L3Logic, 0x624),
        (M::L3Vddm, 0x628),
        (M::L3Temp, 0x62C),
        (M::GfxVolt, 0x960),
        (M::GfxTemp, 0x964),
        (M::GfxClk, 0x968),
        (M::Fclk, 0x978),
        (M::MemClk, 0x97C),
    ],
    cores: 16,
    core_blocks: &[
        (C::Power, 0x400),
        (C::Voltage, 0x440),
        (C::Temperature, 0x480),
        (C::Clock, 0x540),
    ],
};

/// Dragon Range and Fire Range (`0x5400xx`). Desktop silicon: no APU slow
/// limit, no skin sensors, no integrated graphics telemetry.
pub static DRAGON: Layout = Layout {
    name: "Dragon Range",
    fields: &[
        (M::VrmCurrent, 0x18),
        (M::VrmCurrentValue, 0x1C),
        (M::VrmSocCurrent, 0x20),
        (M::VrmSocCurrentValue, 0x24),
        (M::VrmMaxCurrent, 0x28),
        (M::VrmMaxCurrentValue, 0x2C),
        (M::VrmSocMaxCurrent, 0x30),
        (M::VrmSocMaxCurrentValue, 0x34),
        (M::TctlTemp, 0x38),
        (M::TctlTempValue, 0x3C),
        (M::SocketPower, 0x98),
        (M::SocVolt, 0xC0),
        (M::SocPower, 0xC4),
        (M::Fclk, 0x118),
        (M::MemClk, 0x11C),
        (M::L3Clk, 0x560),
        (M::L3Logic, 0x564),
        (M::L3Vddm, 0x568),
        (M::L3Temp, 0x56C),
    ],
    cores: 16,
    core_blocks: &[
        (C::Power, 0x3A0),
        (C::Voltage, 0x3E0),
        (C::Temperature, 0x420),
        (C::Clock, 0x4A0),
    ],
};

const fn table(version: u32, size: usize, layout: &'static Layout) -> KnownTable {
    KnownTable {
        version,
        size,
        layout,
    }
}

/// Every table version with a confirmed size.
pub static KNOWN_TABLES: [KnownTable; 38] = [
    // Raven, Picasso, Dali
    table(0x001E_0001, 0x568, &RAVEN),
    table(0x001E_0002, 0x580, &RAVEN),
    table(0x001E_0003, 0x578, &RAVEN),
    table(0x001E_0004, 0x608, &RAVEN),
    table(0x001E_0005, 0x608, &RAVEN),
    table(0x001E_000A, 0x608, &RAVEN),
    table(0x001E_0101, 0x608, &RAVEN),
    // Renoir, Lucienne
    table(0x0037_0000, 0x794, &RENOIR),
    table(0x0037_0001, 0x884, &RENOIR),
    table(0x0037_0002, 0x88C, &RENOIR),
    table(0x0037_0003, 0x88C, &RENOIR),
    table(0x0037_0004, 0x8AC, &RENOIR),
    table(0x0037_0005, 0x8C8, &RENOIR),
    // Vangogh
    table(0x003F_0000, 0x7AC, &VANGOGH),
    // Cezanne
    table(0x0040_0001, 0x910, &CEZANNE),
    table(0x0040_0002, 0x928, &CEZANNE),
    table(0x0040_0003, 0x94C, &CEZANNE),
    table(0x0040_0004, 0x944, &CEZANNE),
    table(0x0040_0005, 0x944, &CEZANNE),
    // Rembrandt
    table(0x0045_0004, 0xAA4, &REMBRANDT),
    table(0x0045_0005, 0xAB0, &REMBRANDT),
    // Phoenix, Hawk Point
    table(0x004C_0003, 0xB18, &PHOENIX),
    table(0x004C_0004, 0xB1C, &PHOENIX),
    table(0x004C_0005, 0xAF8, &PHOENIX),
    table(0x004C_0006, 0xAFC, &PHOENIX),
    table(0x004C_0007, 0xB00, &PHOENIX),
    table(0x004C_0008, 0xAF0, &PHOENIX),
    table(0x004C_0009, 0xB00, &PHOENIX),
    // Strix Point
    table(0x005D_0008, 0xD54, &STRIX),
    table(0x005D_0009, 0xD58, &STRIX),
    // Krackan Point
    table(0x0065_0004, 0xD4C, &KRACKAN),
    table(0x0065_0005, 0xD60, &KRACKAN),
    // Strix Halo
    table(0x0064_020C, 0xE50, &STRIX_HALO),
    // Dragon Range, Fire Range
    table(0x0054_0000, 0x828, &DRAGON),
    table(0x0054_0001, 0x82C, &DRAGON),
    table(0x0054_0002, 0x88C, &DRAGON),
    table(0x0054_0003, 0x8F0, &DRAGON),
    table(0x0054_0004, 0x948, &DRAGON),
];

/// Look up a known table version.
#[must_use]
pub fn known(version: u32) -> Option<&'static KnownTable> {
    KNOWN_TABLES.iter().find(|t| t.version == version)
}

/// Table size in bytes; [`FALLBACK_TABLE_SIZE`] for unknown versions.
#[must_use]
pub fn table_size(version: u32) -> usize {
    known(version).map_or(FALLBACK_TABLE_SIZE, |t| t.size)
}

/// Largest size among [`KNOWN_TABLES`].
#[must_use]
pub fn largest_known_size() -> usize {
    KNOWN_TABLES.iter().map(|t| t.size).max().unwrap_or(0)
}

/// Byte offset of `metric` in a table of `version`, or `None` if absent.
#[must_use]
pub fn offset(version: u32, metric: Metric) -> Option<usize> {
    let lookup = |fields: &[(Metric, usize)]| {
        fields
            .iter()
            .find(|(m, _)| *m == metric)
            .map(|&(_, off)| off)
    };

    lookup(&LEADING_OFFSETS).or_else(|| known(version).and_then(|t| lookup(t.layout.fields)))
}

/// Byte offset of `metric` for `core` in a table of `version`.
///
/// `None` when the version is unknown, the layout has no such block, or
/// `core` is beyond the layout's core count.
#[must_use]
pub fn core_offset(version: u32, metric: CoreMetric, core: usize) -> Option<usize> {
    let layout = known(version)?.layout;
    if core >= layout.cores {
        return None;
    }
    layout
        .core_blocks
        .iter()
        .find(|(m, _)| *m == metric)
        .map(|&(_, base)| base + 4 * core)
}

/// Number of per-core slots in a table of `version` (0 when unknown).
#[must_use]
pub fn core_count(version: u32) -> usize {
    known(version).map_or(0, |t| t.layout.cores)
}

/// Raven-generation tables report core clocks in GHz; everything newer in MHz.
#[must_use]
pub const fn reports_core_clock_in_ghz(version: u32) -> bool {
    version >> 16 == 0x1E
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renoir_0x370005() {
        assert_eq!(table_size(0x0037_0005), 0x8C8);
        assert_eq!(offset(0x0037_0005, Metric::TctlTemp), Some(0x40));
    }

    #[test]
    fn unknown_version_only_has_leading_fields() {
        let v = 0x0099_9999;
        assert_eq!(table_size(v), FALLBACK_TABLE_SIZE);
        for (i, metric) in Metric::LEADING.into_iter().enumerate() {
            assert_eq!(offset(v, metric), Some(4 * i));
        }
        for metric in Metric::ALL {
            if !Metric::LEADING.contains(&metric) {
                assert_eq!(offset(v, metric), None, "{metric}");
            }
        }
        for metric in CoreMetric::ALL {
            assert_eq!(core_offset(v, metric, 0), None);
        }
    }

    #[test]
    fn fallback_covers_every_known_table() {
        assert!(FALLBACK_TABLE_SIZE >= largest_known_size());
        assert_eq!(largest_known_size(), 0xE50);
    }

    #[test]
    fn versions_are_unique() {
        for (i, a) in KNOWN_TABLES.iter().enumerate() {
            for b in &KNOWN_TABLES[i + 1..] {
                assert_ne!(a.version, b.version);
            }
        }
    }

    #[test]
    fn documented_sizes() {
        assert_eq!(table_size(0x001E_0001), 0x568);
        assert_eq!(table_size(0x001E_0101), 0x608);
        assert_eq!(table_size(0x003F_0000), 0x7AC);
        assert_eq!(table_size(0x0040_0005), 0x944);
        assert_eq!(table_size(0x0045_0005), 0xAB0);
        assert_eq!(table_size(0x004C_0006), 0xAFC);
        assert_eq!(table_size(0x005D_0009), 0xD58);
        assert_eq!(table_size(0x0064_020C), 0xE50);
    }

    #[test]
    fn every_offset_is_aligned_and_in_range() {
        for t in &KNOWN_TABLES {
            for metric in Metric::ALL {
                if let Some(off) = offset(t.version, metric) {
                    assert_eq!(off % 4, 0, "{:#x} {metric}", t.version);
                    assert!(off + 4 <= t.size, "{:#x} {metric} at {off:#x}", t.version);
                }
            }
            for metric in CoreMetric::ALL {
                for core in 0..t.layout.cores {
                    let off = core_offset(t.version, metric, core).unwrap();
                    assert_eq!(off % 4, 0);
                    assert!(off + 4 <= t.size, "{:#x} {metric}[{core}]", t.version);
                }
            }
        }
    }

    #[test]
    fn fields_do_not_overlap() {
        for t in &KNOWN_TABLES {
            let mut offsets: Vec<usize> = Metric::ALL
                .into_iter()
                .filter_map(|m| offset(t.version, m))
                .collect();
            for metric in CoreMetric::ALL {
                offsets.extend((0..t.layout.cores).filter_map(|c| core_offset(t.version, metric, c)));
            }
            let n = offsets.len();
            offsets.sort_unstable();
            offsets.dedup();
            assert_eq!(offsets.len(), n, "{} ({:#x}) reuses a slot", t.layout.name, t.version);
        }
    }

    #[test]
    fn desktop_tables_lack_apu_fields() {
        for metric in [Metric::ApuSkinTemp, Metric::DgpuSkinTemp, Metric::ApuSlowLimit, Metric::GfxClk] {
            assert_eq!(offset(0x0054_0003, metric), None);
        }
        assert_eq!(core_count(0x0054_0003), 16);
    }

    #[test]
    fn core_index_is_bounded() {
        assert_eq!(core_offset(0x0037_0005, CoreMetric::Clock, 7), Some(0x3A0 + 28));
        assert_eq!(core_offset(0x0037_0005, CoreMetric::Clock, 8), None);
    }

    #[test]
    fn ghz_clock_units() {
        assert!(reports_core_clock_in_ghz(0x001E_0004));
        assert!(reports_core_clock_in_ghz(0x001E_0101));
        assert!(!reports_core_clock_in_ghz(0x0037_0005));
    }
}
