//! SoC family identification.
//!
//! Every mailbox address and message id lookup is keyed by [`Family`].
//! Family/model pairs come from CPUID leaf 1 (`Fn0000_0001_EAX`).

use std::fmt;
use std::str::FromStr;

/// Ryzen SoC generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// Zen, 14 nm APU (Ryzen 2000 mobile).
    Raven,
    /// Zen+, 12 nm refresh of Raven (Ryzen 3000 mobile).
    Picasso,
    /// Cut-down Picasso.
    Dali,
    /// Zen 2 APU (Ryzen 4000 mobile).
    Renoir,
    /// Renoir refresh (Ryzen 5000U, Zen 2 parts).
    Lucienne,
    /// Zen 3 APU (Ryzen 5000 mobile).
    Cezanne,
    /// Steam Deck APU.
    Vangogh,
    /// Zen 3+ APU (Ryzen 6000 mobile).
    Rembrandt,
    /// Zen 2, 6 nm low-end APU (Ryzen 7020).
    Mendocino,
    /// Zen 4 APU (Ryzen 7040).
    Phoenix,
    /// Phoenix refresh (Ryzen 8040).
    HawkPoint,
    /// Zen 5 mainstream APU (Ryzen AI 300, Krackan).
    KrackanPoint,
    /// Zen 5 APU (Ryzen AI 300).
    StrixPoint,
    /// Zen 5 large-iGPU APU (Ryzen AI Max).
    StrixHalo,
    /// Zen 4 mobile desktop-class part (Ryzen 7045).
    DragonRange,
    /// Zen 5 mobile desktop-class part (Ryzen 9000HX).
    FireRange,
    /// Not a supported Ryzen SoC.
    Unknown,
}

/// CPUID vendor string for AMD parts.
pub const CPUID_VENDOR_AMD: &str = "AuthenticAMD";

/// Zen / Zen+ / Zen 2 CPUID family.
pub const CPUID_FAMILY_ZEN: u32 = 0x17;
/// Zen 3 / Zen 4 CPUID family.
pub const CPUID_FAMILY_ZEN3: u32 = 0x19;
/// Zen 5 CPUID family.
pub const CPUID_FAMILY_ZEN5: u32 = 0x1A;

impl Family {
    /// All known families, in release order.
    pub const ALL: [Self; 16] = [
        Self::Raven,
        Self::Picasso,
        Self::Dali,
        Self::Renoir,
        Self::Lucienne,
        Self::Cezanne,
        Self::Vangogh,
        Self::Rembrandt,
        Self::Mendocino,
        Self::Phoenix,
        Self::HawkPoint,
        Self::KrackanPoint,
        Self::StrixPoint,
        Self::StrixHalo,
        Self::DragonRange,
        Self::FireRange,
    ];

    /// Decode a family from the CPUID leaf 1 `EAX` register.
    #[must_use]
    pub const fn from_cpuid_eax(eax: u32) -> Self {
        let family = ((eax >> 8) & 0xf) + ((eax >> 20) & 0xff);
        let model = ((eax >> 4) & 0xf) | ((eax >> 12) & 0xf0);
        Self::from_cpuid(family, model)
    }

    /// Decode a family from the effective CPUID family and model numbers.
    #[must_use]
    pub const fn from_cpuid(family: u32, model: u32) -> Self {
        match (family, model) {
            (CPUID_FAMILY_ZEN, 0x11) => Self::Raven,
            (CPUID_FAMILY_ZEN, 0x18) => Self::Picasso,
            (CPUID_FAMILY_ZEN, 0x20) => Self::Dali,
            (CPUID_FAMILY_ZEN, 0x60) => Self::Renoir,
            (CPUID_FAMILY_ZEN, 0x68) => Self::Lucienne,
            (CPUID_FAMILY_ZEN, 0x90) => Self::Vangogh,
            (CPUID_FAMILY_ZEN, 0xA0) => Self::Mendocino,

            (CPUID_FAMILY_ZEN3, 0x50) => Self::Cezanne,
            (CPUID_FAMILY_ZEN3, 0x40 | 0x44) => Self::Rembrandt,
            (CPUID_FAMILY_ZEN3, 0x74 | 0x78) => Self::Phoenix,
            (CPUID_FAMILY_ZEN3, 0x75 | 0x7C) => Self::HawkPoint,
            (CPUID_FAMILY_ZEN3, 0x61) => Self::DragonRange,

            (CPUID_FAMILY_ZEN5, 0x20 | 0x24) => Self::StrixPoint,
            (CPUID_FAMILY_ZEN5, 0x60) => Self::KrackanPoint,
            (CPUID_FAMILY_ZEN5, 0x70) => Self::StrixHalo,
            (CPUID_FAMILY_ZEN5, 0x44) => Self::FireRange,

            _ => Self::Unknown,
        }
    }

    /// Human readable marketing name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Raven => "Raven",
            Self::Picasso => "Picasso",
            Self::Dali => "Dali",
            Self::Renoir => "Renoir",
            Self::Lucienne => "Lucienne",
            Self::Cezanne => "Cezanne",
            Self::Vangogh => "Vangogh",
            Self::Rembrandt => "Rembrandt",
            Self::Mendocino => "Mendocino",
            Self::Phoenix => "Phoenix Point",
            Self::HawkPoint => "Hawk Point",
            Self::KrackanPoint => "Krackan Point",
            Self::StrixPoint => "Strix Point",
            Self::StrixHalo => "Strix Halo",
            Self::DragonRange => "Dragon Range",
            Self::FireRange => "Fire Range",
            Self::Unknown => "Unknown",
        }
    }

    /// First-generation (Zen / Zen+) APU that uses the legacy message set.
    #[must_use]
    pub const fn is_raven_class(&self) -> bool {
        matches!(self, Self::Raven | Self::Picasso | Self::Dali)
    }

    /// Desktop-class silicon in a mobile package (no skin temperature, no APU rails).
    #[must_use]
    pub const fn is_desktop_class(&self) -> bool {
        matches!(self, Self::DragonRange | Self::FireRange)
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a family name cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFamilyError(pub String);

impl fmt::Display for ParseFamilyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown Ryzen family: {}", self.0)
    }
}

impl std::error::Error for ParseFamilyError {}

impl FromStr for Family {
    type Err = ParseFamilyError;

    /// Accepts marketing names case-insensitively, ignoring spaces, `-` and `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_ascii_lowercase();

        let family = match key.as_str() {
            "raven" => Self::Raven,
            "picasso" => Self::Picasso,
            "dali" => Self::Dali,
            "renoir" => Self::Renoir,
            "lucienne" => Self::Lucienne,
            "cezanne" => Self::Cezanne,
            "vangogh" => Self::Vangogh,
            "rembrandt" => Self::Rembrandt,
            "mendocino" => Self::Mendocino,
            "phoenix" | "phoenixpoint" => Self::Phoenix,
            "hawkpoint" => Self::HawkPoint,
            "krackan" | "krackanpoint" => Self::KrackanPoint,
            "strixpoint" => Self::StrixPoint,
            "strixhalo" => Self::StrixHalo,
            "dragonrange" => Self::DragonRange,
            "firerange" => Self::FireRange,
            _ => return Err(ParseFamilyError(s.to_string())),
        };
        Ok(family)
    }
}
