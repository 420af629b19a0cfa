//! `ryzen` — adjust power limits and read telemetry on Ryzen mobile SoCs.
//!
//! ```text
//! USAGE:
//!   ryzen --info                           Family, BIOS interface, key metrics
//!   ryzen --dump-table                     Raw PM table (offset / hex / float)
//!   ryzen --stapm-limit 25000 --tctl-temp 90
//!   ryzen --backend simulated --family renoir --info
//! ```
//!
//! Every requested adjustment is attempted; the exit status is nonzero if
//! any of them failed.

use anyhow::{bail, Context, Result};
use clap::{Args, CommandFactory, Parser};
use ryzen_chip::pm_table::{reports_core_clock_in_ghz, Metric};
use ryzen_chip::{Family, Tunable};
use ryzen_driver::{BackendSelection, Session, SessionConfig};
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ryzen", about = "Ryzen SMU power limit and telemetry tool", version)]
struct Cli {
    /// Print family, BIOS interface version and PM table metrics.
    #[arg(short, long)]
    info: bool,

    /// Dump the raw PM table (before and after when adjusting).
    #[arg(long)]
    dump_table: bool,

    /// Backend: auto, kernel, devmem or simulated.
    #[arg(long)]
    backend: Option<BackendSelection>,

    /// SoC family, skipping CPUID detection.
    #[arg(long)]
    family: Option<Family>,

    /// SMU response timeout in milliseconds.
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Debug logging (overrides RUST_LOG).
    #[arg(short, long)]
    verbose: bool,

    #[command(flatten)]
    adjust: Adjustments,
}

/// Accept decimal or `0x` hexadecimal.
fn parse_value(s: &str) -> std::result::Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("'{s}' is not a u32: {e}"))
}

macro_rules! adjustments {
    (
        values { $($(#[doc = $doc:literal])* $field:ident => $tunable:ident,)* }
        triggers { $($(#[doc = $tdoc:literal])* $tfield:ident => $ttunable:ident,)* }
    ) => {
        #[derive(Args, Debug, Default)]
        #[command(next_help_heading = "Adjustments")]
        struct Adjustments {
            $(
                $(#[doc = $doc])*
                #[arg(long, value_name = "VALUE", value_parser = parse_value)]
                $field: Option<u32>,
            )*
            $(
                $(#[doc = $tdoc])*
                #[arg(long)]
                $tfield: bool,
            )*
        }

        impl Adjustments {
            /// Requested adjustments, in table order.
            fn requested(&self) -> Vec<(Tunable, u32)> {
                let mut out = Vec::new();
                $(
                    if let Some(value) = self.$field {
                        out.push((Tunable::$tunable, value));
                    }
                )*
                $(
                    if self.$tfield {
                        out.push((Tunable::$ttunable, 0));
                    }
                )*
                out
            }
        }
    };
}

adjustments! {
    values {
        /// Sustained power limit (mW).
        stapm_limit => StapmLimit,
        /// Actual power limit (mW).
        fast_limit => FastLimit,
        /// Average power limit (mW).
        slow_limit => SlowLimit,
        /// Slow PPT time constant (s).
        slow_time => SlowTime,
        /// STAPM time constant (s).
        stapm_time => StapmTime,
        /// APU PPT slow limit for APU-only platforms (mW).
        apu_slow_limit => ApuSlowLimit,
        /// Skin temperature power limit (mW).
        skin_temp_limit => SkinTempPowerLimit,
        /// Tctl temperature limit (°C).
        tctl_temp => TctlTemp,
        /// APU skin temperature limit (°C).
        apu_skin_temp => ApuSkinTempLimit,
        /// dGPU skin temperature limit (°C).
        dgpu_skin_temp => DgpuSkinTempLimit,
        /// VRM current limit, TDC (mA).
        vrm_current => VrmCurrent,
        /// VRM SoC current limit, TDC (mA).
        vrmsoc_current => VrmSocCurrent,
        /// VRM GFX current limit (mA).
        vrmgfx_current => VrmGfxCurrent,
        /// VRM CVIP current limit (mA).
        vrmcvip_current => VrmCvipCurrent,
        /// VRM maximum current limit, EDC (mA).
        vrmmax_current => VrmMaxCurrent,
        /// VRM GFX maximum current limit (mA).
        vrmgfxmax_current => VrmGfxMaxCurrent,
        /// VRM SoC maximum current limit, EDC (mA).
        vrmsocmax_current => VrmSocMaxCurrent,
        /// PSI0 VDD current limit (mA).
        psi0_current => Psi0Current,
        /// PSI3 CPU current limit (mA).
        psi3cpu_current => Psi3CpuCurrent,
        /// PSI0 SoC current limit (mA).
        psi0soc_current => Psi0SocCurrent,
        /// PSI3 GFX current limit (mA).
        psi3gfx_current => Psi3GfxCurrent,
        /// Maximum GFX clock (MHz).
        max_gfxclk => MaxGfxclkFreq,
        /// Minimum GFX clock (MHz).
        min_gfxclk => MinGfxclkFreq,
        /// Maximum SoC clock (MHz).
        max_socclk_frequency => MaxSocclkFreq,
        /// Minimum SoC clock (MHz).
        min_socclk_frequency => MinSocclkFreq,
        /// Maximum fabric clock (MHz).
        max_fclk_frequency => MaxFclkFreq,
        /// Minimum fabric clock (MHz).
        min_fclk_frequency => MinFclkFreq,
        /// Maximum video core clock (MHz).
        max_vcn => MaxVcn,
        /// Minimum video core clock (MHz).
        min_vcn => MinVcn,
        /// Maximum data launch clock (MHz).
        max_lclk => MaxLclk,
        /// Minimum data launch clock (MHz).
        min_lclk => MinLclk,
        /// Forced GFX clock (MHz).
        gfx_clk => GfxClk,
        /// PROCHOT deassertion ramp time.
        prochot_deassertion_ramp => ProchotDeassertionRamp,
        /// All-core overclock frequency (MHz).
        oc_clk => OcClk,
        /// Per-core overclock frequency (core << 20 | MHz).
        per_core_oc_clk => PerCoreOcClk,
        /// Overclock voltage (VID).
        oc_volt => OcVolt,
        /// All-core curve optimizer offset.
        set_coall => CoAll,
        /// Per-core curve optimizer offset.
        set_coper => CoPer,
        /// iGPU curve optimizer offset.
        set_cogfx => CoGfx,
    }
    triggers {
        /// Enable manual overclocking.
        enable_oc => EnableOc,
        /// Return to default clocking.
        disable_oc => DisableOc,
        /// Hidden power-saving profile.
        power_saving => PowerSaving,
        /// Hidden max-performance profile.
        max_performance => MaxPerformance,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into())
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let requested = cli.adjust.requested();
    if requested.is_empty() && !cli.info && !cli.dump_table {
        Cli::command().print_help()?;
        return Ok(());
    }

    let mut session = open_session(&cli)?;

    let wants_table = cli.info || cli.dump_table;
    if wants_table {
        if let Err(e) = session.init_table() {
            warn!("PM table unavailable: {e}");
        }
    }
    let before = if cli.dump_table && !requested.is_empty() {
        session.table_values().map(<[f32]>::to_vec)
    } else {
        None
    };

    if cli.info {
        cmd_info(&mut session);
    }

    let failed = cmd_adjust(&mut session, &requested);

    if wants_table && !requested.is_empty() {
        if let Err(e) = session.refresh_table() {
            warn!("PM table refresh after adjusting failed: {e}");
        }
    }

    if cli.dump_table {
        cmd_dump_table(&session, before.as_deref());
    }

    if failed > 0 {
        bail!("{failed} of {} adjustments failed", requested.len());
    }
    Ok(())
}

fn open_session(cli: &Cli) -> Result<Session> {
    let mut config = SessionConfig::from_env();
    if let Some(backend) = cli.backend {
        config = config.with_backend(backend);
    }
    if let Some(family) = cli.family {
        config = config.with_family(family);
    }
    if let Some(ms) = cli.timeout_ms {
        config = config.with_response_timeout(Duration::from_millis(ms));
    }

    Session::open(&config).context("Cannot open SMU session (is ryzen_smu loaded, or are you root?)")
}

/// Apply every adjustment, reporting each; returns how many failed.
fn cmd_adjust(session: &mut Session, requested: &[(Tunable, u32)]) -> usize {
    let mut failed = 0;
    for &(tunable, value) in requested {
        match session.set(tunable, value) {
            Ok(()) => println!("Set {tunable} to {value}"),
            Err(e) => {
                eprintln!("Failed to set {tunable}: {e} (code {})", e.code());
                failed += 1;
            }
        }
    }
    failed
}

fn cmd_info(session: &mut Session) {
    println!("CPU Family           : {}", session.family());
    println!("Backend              : {}", session.backend_type());
    match session.bios_interface_version() {
        Ok(v) => println!("SMU BIOS Interface   : {v}"),
        Err(e) => println!("SMU BIOS Interface   : unavailable ({e})"),
    }

    let Some(version) = session.table_version() else {
        println!("PM Table Version     : unavailable");
        return;
    };
    println!("PM Table Version     : {version:#x}");
    println!();
    println!("|{:-<30}|{:-<16}|", "", "");
    println!("| {:<28} | {:>14} |", "Name", "Value");
    println!("|{:-<30}|{:-<16}|", "", "");
    for metric in Metric::ALL {
        let value = session.metric(metric);
        if !value.is_nan() {
            println!("| {:<28} | {value:>14.3} |", metric.name());
        }
    }

    // Raven-generation tables carry GHz; show everything in MHz
    let scale = if reports_core_clock_in_ghz(version) { 1000.0 } else { 1.0 };
    for core in 0..session.core_count() {
        let clk = session.core_clk(core) * scale;
        let power = session.core_power(core);
        let temp = session.core_temp(core);
        println!(
            "| core {core:<2} {:<19} | {clk:>8.0} MHz {power:>6.3} W {temp:>5.1} °C",
            ""
        );
    }
    println!("|{:-<30}|{:-<16}|", "", "");
}

fn cmd_dump_table(session: &Session, before: Option<&[f32]>) {
    let Some(values) = session.table_values() else {
        println!("PM table unavailable");
        return;
    };

    match before {
        Some(_) => println!("| Offset |    Data    |    Before    |    After     |"),
        None => println!("| Offset |    Data    |    Value     |"),
    }
    for (i, value) in values.iter().enumerate() {
        let offset = i * 4;
        match before.and_then(|b| b.get(i)) {
            Some(old) => println!(
                "| {offset:#06X} | {:#010X} | {old:>12.6} | {value:>12.6} |",
                value.to_bits()
            ),
            None => println!("| {offset:#06X} | {:#010X} | {value:>12.6} |", value.to_bits()),
        }
    }
}
