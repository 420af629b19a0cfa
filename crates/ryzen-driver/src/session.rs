//! SMU session
//!
//! A [`Session`] owns one backend, the detected family and both probed
//! mailboxes. Tunable dispatch (`dispatch.rs`), PM table access
//! (`pm_table.rs`) and metric getters (`metrics.rs`) are further
//! `impl Session` blocks.
//!
//! ```text
//! open ─► select backend ─► detect family ─► resolve MP1/PSMU ─► probe both
//!                                                                   │
//!                                      at least one answered ◄──────┘
//! ```

use crate::backend::{select_backend, BackendType, SmuBackend};
use crate::config::{SessionConfig, UnknownFamilyPolicy};
use crate::detect::{CpuidDetector, FamilyDetector, FixedFamily};
use crate::error::{Result, SmuError};
use crate::mailbox::{Mailbox, Request, Response};
use crate::pm_table::PmTable;
use ryzen_chip::mailbox;
use ryzen_chip::smu;
use ryzen_chip::{EndpointKind, Family, MailboxAddrs};
use std::cell::OnceCell;
use tracing::{debug, info, warn};

/// Open connection to the SMU
#[derive(Debug)]
pub struct Session {
    pub(crate) backend: Box<dyn SmuBackend>,
    detector: Box<dyn FamilyDetector>,
    family: OnceCell<Family>,
    mp1: Option<Mailbox>,
    psmu: Option<Mailbox>,
    bios_version: OnceCell<u32>,
    pub(crate) table: Option<PmTable>,
}

impl Session {
    /// Open the backend named by `config` and probe the mailboxes
    ///
    /// # Errors
    ///
    /// Returns error if no backend can be opened, the family has no known
    /// mailbox layout (under the strict policy), or neither mailbox answers.
    pub fn open(config: &SessionConfig) -> Result<Self> {
        let backend = select_backend(config)?;
        Self::with_backend(backend, config)
    }

    /// Build a session on an already opened backend
    ///
    /// The family comes from `config.family_override`, then the backend's own
    /// hint (simulated backends), then CPUID.
    ///
    /// # Errors
    ///
    /// As for [`open`](Self::open), minus backend selection.
    pub fn with_backend(backend: Box<dyn SmuBackend>, config: &SessionConfig) -> Result<Self> {
        let detector: Box<dyn FamilyDetector> =
            match config.family_override.or_else(|| backend.family_hint()) {
                Some(family) => Box::new(FixedFamily(family)),
                None => Box::new(CpuidDetector),
            };
        Self::with_detector(backend, detector, config)
    }

    /// Build a session with an explicit family detector
    ///
    /// # Errors
    ///
    /// As for [`with_backend`](Self::with_backend).
    pub fn with_detector(
        backend: Box<dyn SmuBackend>,
        detector: Box<dyn FamilyDetector>,
        config: &SessionConfig,
    ) -> Result<Self> {
        let mut session = Self {
            backend,
            detector,
            family: OnceCell::new(),
            mp1: None,
            psmu: None,
            bios_version: OnceCell::new(),
            table: None,
        };

        let family = session.family();
        for kind in [EndpointKind::Mp1, EndpointKind::Psmu] {
            let addrs = resolve_addrs(family, kind, config.unknown_family)?;
            let candidate = Mailbox::new(kind, addrs, config.response_timeout);
            if candidate.probe(session.backend.as_mut()) {
                debug!("{kind} mailbox at {:#010x} answered", addrs.message);
                match kind {
                    EndpointKind::Mp1 => session.mp1 = Some(candidate),
                    EndpointKind::Psmu => session.psmu = Some(candidate),
                }
            } else {
                warn!("{kind} mailbox did not answer its probe, marking it absent");
            }
        }

        if session.mp1.is_none() && session.psmu.is_none() {
            return Err(SmuError::NoMailbox);
        }

        info!(
            "SMU session open: {family} via {} (MP1 {}, PSMU {})",
            session.backend.backend_type(),
            presence(session.mp1.as_ref()),
            presence(session.psmu.as_ref())
        );

        Ok(session)
    }

    /// Detected SoC family, computed once per session
    pub fn family(&self) -> Family {
        *self.family.get_or_init(|| self.detector.detect())
    }

    /// Which backend this session talks through
    pub fn backend_type(&self) -> BackendType {
        self.backend.backend_type()
    }

    /// `true` when `kind` passed its probe
    pub fn has_mailbox(&self, kind: EndpointKind) -> bool {
        self.mailbox(kind).is_ok()
    }

    /// BIOS interface version (MP1 message 0x3), cached after the first success
    ///
    /// # Errors
    ///
    /// Returns error if MP1 is absent or the SMU refuses the query.
    pub fn bios_interface_version(&mut self) -> Result<u32> {
        if let Some(&version) = self.bios_version.get() {
            return Ok(version);
        }
        let response = self.send(EndpointKind::Mp1, &Request::new(smu::GET_BIOS_IF_VERSION))?;
        let version = response.args[0];
        debug!("BIOS interface version {version:#x}");
        Ok(*self.bios_version.get_or_init(|| version))
    }

    /// Send one request to `kind` and classify the reply
    ///
    /// # Errors
    ///
    /// Returns `MailboxUnavailable` if `kind` failed its probe, otherwise
    /// whatever [`Mailbox::send`] returns.
    pub fn send(&mut self, kind: EndpointKind, request: &Request) -> Result<Response> {
        let mailbox = self.mailbox(kind)?;
        mailbox.send(self.backend.as_mut(), request)
    }

    /// Release the backend and the table buffer
    pub fn close(self) {
        drop(self);
    }

    fn mailbox(&self, kind: EndpointKind) -> Result<Mailbox> {
        let mailbox = match kind {
            EndpointKind::Mp1 => self.mp1,
            EndpointKind::Psmu => self.psmu,
        };
        mailbox.ok_or(SmuError::MailboxUnavailable { endpoint: kind })
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        debug!("Closing SMU session ({})", self.backend.backend_type());
    }
}

fn resolve_addrs(
    family: Family,
    kind: EndpointKind,
    policy: UnknownFamilyPolicy,
) -> Result<MailboxAddrs> {
    if let Some(addrs) = mailbox::resolve(family, kind) {
        return Ok(addrs);
    }
    match policy {
        UnknownFamilyPolicy::Strict => Err(SmuError::family_unsupported(
            family,
            format!("{kind} mailbox resolution"),
        )),
        UnknownFamilyPolicy::LegacyDefault => {
            warn!("No {kind} layout for {family}, assuming the first-generation layout");
            Ok(mailbox::legacy_default(kind))
        }
    }
}

const fn presence(mailbox: Option<&Mailbox>) -> &'static str {
    if mailbox.is_some() {
        "present"
    } else {
        "absent"
    }
}
