//! SMU transaction engine
//!
//! One exchange on a C2PMSG mailbox:
//!
//! ```text
//! 1. response  ← 0
//! 2. arg[0..6] ← request.args
//! 3. message   ← request.message      (SMU starts executing)
//! 4. poll response until nonzero, bounded by the timeout
//! 5. args      ← arg[0..6]
//! ```

use crate::backend::SmuBackend;
use crate::error::{Result, SmuError};
use ryzen_chip::mailbox::ARG_COUNT;
use ryzen_chip::smu::{self, Outcome};
use ryzen_chip::{EndpointKind, MailboxAddrs, Status};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Message id plus its six argument words
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    /// Message id
    pub message: u32,
    /// Argument registers
    pub args: [u32; ARG_COUNT],
}

impl Request {
    /// Request with all arguments zero
    pub const fn new(message: u32) -> Self {
        Self {
            message,
            args: [0; ARG_COUNT],
        }
    }

    /// Request carrying one argument
    pub const fn with_arg(message: u32, arg0: u32) -> Self {
        let mut args = [0; ARG_COUNT];
        args[0] = arg0;
        Self { message, args }
    }
}

/// Reply read back after the SMU answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response {
    /// Decoded response register
    pub status: Status,
    /// Argument registers after execution
    pub args: [u32; ARG_COUNT],
}

/// One resolved and probed SMU mailbox
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mailbox {
    kind: EndpointKind,
    addrs: MailboxAddrs,
    timeout: Duration,
}

impl Mailbox {
    /// Mailbox at `addrs`; nothing is touched until the first exchange.
    pub const fn new(kind: EndpointKind, addrs: MailboxAddrs, timeout: Duration) -> Self {
        Self {
            kind,
            addrs,
            timeout,
        }
    }

    /// MP1 or PSMU
    pub const fn kind(&self) -> EndpointKind {
        self.kind
    }

    /// Register addresses
    pub const fn addrs(&self) -> MailboxAddrs {
        self.addrs
    }

    /// Run one exchange and return the raw reply
    ///
    /// # Errors
    ///
    /// Returns `SmuTimeout` if the response register stays zero past the
    /// deadline, or the backend's error if a register access fails.
    pub fn execute(&self, backend: &mut dyn SmuBackend, request: &Request) -> Result<Response> {
        debug!(
            "{} request {:#x} args {:x?}",
            self.kind, request.message, request.args
        );

        backend.write_register(self.addrs.response, 0)?;
        for (i, arg) in request.args.iter().enumerate() {
            backend.write_register(self.addrs.arg(i), *arg)?;
        }
        backend.write_register(self.addrs.message, request.message)?;

        let raw = self.wait_for_response(backend, request.message)?;

        let mut args = [0u32; ARG_COUNT];
        for (i, arg) in args.iter_mut().enumerate() {
            *arg = backend.read_register(self.addrs.arg(i))?;
        }

        let response = Response {
            status: Status::from_raw(raw),
            args,
        };
        debug!(
            "{} reply {:#x}: {} args {:x?}",
            self.kind, request.message, response.status, response.args
        );
        Ok(response)
    }

    /// Run one exchange and classify the reply
    ///
    /// # Errors
    ///
    /// Returns `SmuUnsupported` for UnknownCommand, `SmuRejected` for any
    /// other non-OK code, plus everything [`execute`](Self::execute) returns.
    pub fn send(&self, backend: &mut dyn SmuBackend, request: &Request) -> Result<Response> {
        let response = self.execute(backend, request)?;
        match response.status.outcome() {
            Outcome::Success => Ok(response),
            Outcome::Unsupported => Err(SmuError::SmuUnsupported {
                endpoint: self.kind,
                message: request.message,
            }),
            Outcome::Rejected => Err(SmuError::SmuRejected {
                endpoint: self.kind,
                message: request.message,
                status: response.status,
            }),
        }
    }

    /// Check the mailbox is usable
    ///
    /// The sentinel write catches a read-only register bus (locked-down
    /// firmware); the test message catches a mailbox that is not there.
    pub fn probe(&self, backend: &mut dyn SmuBackend) -> bool {
        let readback = backend
            .write_register(self.addrs.arg_base, smu::PROBE_SENTINEL)
            .and_then(|()| backend.read_register(self.addrs.arg_base));
        match readback {
            Ok(smu::PROBE_SENTINEL) => {}
            Ok(value) => {
                debug!(
                    "{} sentinel read back as {value:#x}, bus is read-only",
                    self.kind
                );
                return false;
            }
            Err(e) => {
                debug!("{} sentinel access failed: {e}", self.kind);
                return false;
            }
        }

        match self.execute(backend, &Request::new(smu::TEST_MESSAGE)) {
            Ok(response) if response.status.is_ok() => true,
            Ok(response) => {
                debug!("{} test message answered {}", self.kind, response.status);
                false
            }
            Err(e) => {
                debug!("{} test message failed: {e}", self.kind);
                false
            }
        }
    }

    fn wait_for_response(&self, backend: &mut dyn SmuBackend, message: u32) -> Result<u32> {
        let start = Instant::now();

        loop {
            let raw = backend.read_register(self.addrs.response)?;
            if raw != 0 {
                trace!("{} answered after {:?}", self.kind, start.elapsed());
                return Ok(raw);
            }

            if start.elapsed() > self.timeout {
                return Err(SmuError::SmuTimeout {
                    endpoint: self.kind,
                    message,
                    duration_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                });
            }

            std::thread::yield_now();
        }
    }
}
