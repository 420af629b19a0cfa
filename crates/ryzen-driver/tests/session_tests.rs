//! Session scenarios against the simulated SMU
//!
//! These drive the full register protocol (mailbox writes, polling, table
//! transfer and copy) without hardware.

use ryzen_driver::backends::{LivePolicy, SimulatedBackend};
use ryzen_driver::prelude::*;
use std::time::{Duration, Instant};

const RENOIR_TRANSFER: u32 = 0x65;

fn open(sim: &SimulatedBackend) -> Session {
    Session::with_backend(Box::new(sim.clone()), &SessionConfig::default())
        .expect("simulated session")
}

// ── Tunable dispatch ─────────────────────────────────────────────────────────

#[test]
fn renoir_stapm_falls_back_to_psmu() {
    let sim = SimulatedBackend::new(Family::Renoir).script(
        EndpointKind::Mp1,
        0x14,
        &[Status::UnknownCommand],
    );
    let mut session = open(&sim);
    sim.clear_log();

    session.set_stapm_limit(15_000).expect("fallback succeeds");

    let log = sim.transactions();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].endpoint, EndpointKind::Mp1);
    assert_eq!(log[0].message, 0x14);
    assert_eq!(log[0].args[0], 15_000);
    assert_eq!(log[0].status, Some(Status::UnknownCommand));
    assert_eq!(log[1].endpoint, EndpointKind::Psmu);
    assert_eq!(log[1].message, 0x31);
    assert_eq!(log[1].args[0], 15_000);
    assert_eq!(log[1].status, Some(Status::Ok));
}

#[test]
fn renoir_stapm_primary_success_skips_fallback() {
    let sim = SimulatedBackend::new(Family::Renoir);
    let mut session = open(&sim);
    sim.clear_log();

    session.set(Tunable::StapmLimit, 15_000).unwrap();
    assert_eq!(sim.transactions().len(), 1);
    assert_eq!(sim.count(EndpointKind::Psmu, 0x31), 0);
}

#[test]
fn both_routes_refused_reports_the_fallback_error() {
    let sim = SimulatedBackend::new(Family::Lucienne)
        .script(EndpointKind::Mp1, 0x14, &[Status::RejectedBusy])
        .script(EndpointKind::Psmu, 0x31, &[Status::Failed]);
    let mut session = open(&sim);

    let err = session.set_stapm_limit(15_000).unwrap_err();
    assert!(matches!(
        err,
        SmuError::SmuRejected {
            endpoint: EndpointKind::Psmu,
            message: 0x31,
            status: Status::Failed,
        }
    ));
    assert_eq!(err.code(), -4);
}

#[test]
fn timeout_is_not_retried_on_the_fallback() {
    let sim = SimulatedBackend::new(Family::Renoir);
    let config = SessionConfig::default().with_response_timeout(Duration::from_millis(20));
    let mut session = Session::with_backend(Box::new(sim.clone()), &config).unwrap();
    sim.set_unresponsive(EndpointKind::Mp1, true);

    let start = Instant::now();
    let err = session.set_stapm_limit(15_000).unwrap_err();
    assert!(start.elapsed() >= Duration::from_millis(20));
    assert!(matches!(
        err,
        SmuError::SmuTimeout {
            endpoint: EndpointKind::Mp1,
            message: 0x14,
            ..
        }
    ));
    assert_eq!(err.code(), -2);
    assert_eq!(sim.count(EndpointKind::Psmu, 0x31), 0);
}

#[test]
fn rembrandt_curve_optimizer_uses_mp1() {
    let sim = SimulatedBackend::new(Family::Rembrandt);
    let mut session = open(&sim);
    sim.clear_log();

    let offset = 0x0010_0000u32.wrapping_sub(10);
    session.set_coall(offset).unwrap();

    let log = sim.transactions();
    assert_eq!(log[0].endpoint, EndpointKind::Mp1);
    assert_eq!(log[0].message, 0x4C);
    assert_eq!(log[0].args[0], offset);
}

#[test]
fn triggers_ignore_the_value() {
    let sim = SimulatedBackend::new(Family::Phoenix);
    let mut session = open(&sim);
    sim.clear_log();

    session.set_max_performance(1234).unwrap();
    assert_eq!(sim.transactions()[0].message, 0x11);
    assert_eq!(sim.transactions()[0].args[0], 0);
}

// ── PM table ─────────────────────────────────────────────────────────────────

#[test]
fn init_table_resolves_renoir_layout() {
    let sim = SimulatedBackend::new(Family::Renoir);
    sim.set_table_f32(0x40, 95.0);
    let mut session = open(&sim);

    session.init_table().unwrap();

    assert_eq!(session.table_version(), Some(0x0037_0005));
    assert_eq!(session.table_size(), Some(0x8C8));
    assert_eq!(session.pm_table().unwrap().address(), sim.table_address());
    assert_eq!(session.table_values().unwrap().len(), 0x8C8 / 4);
    assert!((session.tctl_temp() - 95.0).abs() < f32::EPSILON);
    assert_eq!(sim.transfer_count(), 1);
}

#[test]
fn transfer_retries_twice_with_backoff() {
    let sim = SimulatedBackend::new(Family::Renoir).script(
        EndpointKind::Psmu,
        RENOIR_TRANSFER,
        &[Status::RejectedPrerequisite, Status::RejectedPrerequisite],
    );
    let mut session = open(&sim);

    let start = Instant::now();
    session.init_table().expect("third attempt succeeds");

    assert!(start.elapsed() >= Duration::from_millis(110));
    assert_eq!(sim.count(EndpointKind::Psmu, RENOIR_TRANSFER), 3);
    assert!(session.table_values().is_some());
}

#[test]
fn transfer_gives_up_after_three_attempts() {
    let sim = SimulatedBackend::new(Family::Renoir).script(
        EndpointKind::Psmu,
        RENOIR_TRANSFER,
        &[Status::RejectedPrerequisite; 4],
    );
    let mut session = open(&sim);

    let err = session.init_table().unwrap_err();
    assert!(matches!(
        err,
        SmuError::SmuRejected {
            status: Status::RejectedPrerequisite,
            ..
        }
    ));
    assert_eq!(sim.count(EndpointKind::Psmu, RENOIR_TRANSFER), 3);

    // Located but never populated
    assert_eq!(session.table_size(), Some(0x8C8));
    assert!(session.table_values().is_none());
    assert!(session.stapm_limit().is_nan());
}

#[test]
fn other_rejections_are_not_retried() {
    let sim = SimulatedBackend::new(Family::Cezanne).script(
        EndpointKind::Psmu,
        RENOIR_TRANSFER,
        &[Status::RejectedBusy],
    );
    let mut session = open(&sim);

    assert!(session.init_table().is_err());
    assert_eq!(sim.count(EndpointKind::Psmu, RENOIR_TRANSFER), 1);
}

#[test]
fn raven_stale_first_transfer_is_repeated() {
    let sim = SimulatedBackend::new(Family::Raven);
    let mut session = open(&sim);

    session.init_table().unwrap();

    assert_eq!(sim.transfer_count(), 2);
    assert_eq!(sim.count(EndpointKind::Psmu, 0x3D), 2);
    assert_eq!(sim.transactions().last().unwrap().args[0], 3);
    assert!((session.stapm_limit() - 1.0).abs() < f32::EPSILON);
}

#[test]
fn stale_check_only_applies_to_affected_families() {
    let sim = SimulatedBackend::new(Family::Renoir).with_stale_first_transfer(true);
    let mut session = open(&sim);

    session.init_table().unwrap();

    assert_eq!(sim.transfer_count(), 1);
    assert!(session.stapm_limit().abs() < f32::EPSILON);
}

#[test]
fn refresh_is_idempotent() {
    for family in [Family::Raven, Family::Renoir, Family::Phoenix, Family::DragonRange] {
        let sim = SimulatedBackend::new(family);
        let mut session = open(&sim);

        session.refresh_table().unwrap();
        let first = session.table_values().unwrap().to_vec();
        session.refresh_table().unwrap();
        let second = session.table_values().unwrap().to_vec();

        assert_eq!(first, second, "{family}");
    }
}

#[test]
fn failed_refresh_keeps_last_snapshot() {
    let sim = SimulatedBackend::new(Family::Renoir);
    let mut session = open(&sim);
    session.init_table().unwrap();
    let before = session.table_values().unwrap().to_vec();

    sim.set_table_f32(0x0, 42.0);
    sim.push_replies(EndpointKind::Psmu, RENOIR_TRANSFER, &[Status::Failed]);
    assert!(session.refresh_table().is_err());
    assert_eq!(session.table_values().unwrap(), before.as_slice());

    session.refresh_table().unwrap();
    assert!((session.stapm_limit() - 42.0).abs() < f32::EPSILON);
}

#[test]
fn live_comparison_skips_transfer_when_already_republished() {
    let sim = SimulatedBackend::new(Family::Rembrandt).with_live_policy(LivePolicy::CompareLive);
    let mut session = open(&sim);
    session.init_table().unwrap();

    // Nobody else touched the table: we must transfer
    session.refresh_table().unwrap();
    assert_eq!(sim.transfer_count(), 2);

    // Another client published a newer snapshot: copy only
    sim.set_table_f32(0x4, 12.5);
    sim.publish_now();
    session.refresh_table().unwrap();
    assert_eq!(sim.transfer_count(), 2);
    assert!((session.stapm_value() - 12.5).abs() < f32::EPSILON);
}

#[test]
fn unknown_version_uses_reported_size() {
    let sim = SimulatedBackend::new(Family::StrixPoint)
        .with_table_version(0x0099_9999)
        .with_reported_table_size(Some(0x800));
    let mut session = open(&sim);

    session.init_table().unwrap();
    assert_eq!(session.table_size(), Some(0x800));
    assert!(!session.slow_value().is_nan());
    assert!(session.tctl_temp().is_nan());
}

#[test]
fn unknown_version_without_report_uses_fallback_size() {
    let sim = SimulatedBackend::new(Family::Mendocino);
    let mut session = open(&sim);

    session.init_table().unwrap();
    assert_eq!(session.table_size(), Some(0x1000));
}

#[test]
fn table_requires_psmu() {
    let sim = SimulatedBackend::new(Family::Renoir).read_only(EndpointKind::Psmu);
    let mut session = open(&sim);

    let err = session.init_table().unwrap_err();
    assert!(matches!(err, SmuError::MailboxUnavailable { .. }));
    assert!(session.table_version().is_none());
}

// ── Session lifecycle ────────────────────────────────────────────────────────

#[test]
fn open_with_simulated_selection() {
    let config = SessionConfig::default()
        .with_backend(BackendSelection::Simulated)
        .with_family(Family::Cezanne);
    let mut session = Session::open(&config).unwrap();

    assert_eq!(session.family(), Family::Cezanne);
    assert_eq!(session.bios_interface_version().unwrap(), 5);
    session.close();
}

#[test]
fn independent_sessions_do_not_share_tables() {
    let a = SimulatedBackend::new(Family::Renoir);
    let b = SimulatedBackend::new(Family::Renoir);
    a.set_table_f32(0x0, 10.0);
    b.set_table_f32(0x0, 20.0);

    let mut sa = open(&a);
    let mut sb = open(&b);
    sa.init_table().unwrap();
    sb.init_table().unwrap();

    assert!((sa.stapm_limit() - 10.0).abs() < f32::EPSILON);
    assert!((sb.stapm_limit() - 20.0).abs() < f32::EPSILON);
}

#[test]
fn no_mailbox_fails_open() {
    let sim = SimulatedBackend::new(Family::Phoenix)
        .read_only(EndpointKind::Mp1)
        .read_only(EndpointKind::Psmu);
    let err = Session::with_backend(Box::new(sim), &SessionConfig::default()).unwrap_err();
    assert!(matches!(err, SmuError::NoMailbox));
}
