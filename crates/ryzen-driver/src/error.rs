//! Error types for SMU operations

use ryzen_chip::{EndpointKind, Family, Status};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for SMU operations
pub type Result<T> = std::result::Result<T, SmuError>;

/// Legacy numeric code: no mapping for this family.
pub const ADJ_ERR_FAM_UNSUPPORTED: i32 = -1;
/// Legacy numeric code: the SMU never answered.
pub const ADJ_ERR_SMU_TIMEOUT: i32 = -2;
/// Legacy numeric code: the SMU does not know the message.
pub const ADJ_ERR_SMU_UNSUPPORTED: i32 = -3;
/// Legacy numeric code: the SMU refused the message.
pub const ADJ_ERR_SMU_REJECTED: i32 = -4;
/// Legacy numeric code: physical memory could not be mapped or copied.
pub const ADJ_ERR_MEMORY_ACCESS: i32 = -5;

/// Errors that can occur while talking to the SMU
#[derive(Debug, Error)]
pub enum SmuError {
    /// No message id or layout is known for this family
    #[error("{operation} is not supported on {family}")]
    FamilyUnsupported {
        /// Detected family
        family: Family,
        /// What was attempted
        operation: String,
    },

    /// The response register stayed zero past the deadline
    #[error("SMU timeout after {duration_ms}ms waiting for {endpoint} message {message:#x}")]
    SmuTimeout {
        /// Mailbox the message was sent to
        endpoint: EndpointKind,
        /// Message id
        message: u32,
        /// Deadline in milliseconds
        duration_ms: u64,
    },

    /// The SMU answered UnknownCommand
    #[error("{endpoint} does not implement message {message:#x}")]
    SmuUnsupported {
        /// Mailbox the message was sent to
        endpoint: EndpointKind,
        /// Message id
        message: u32,
    },

    /// The SMU answered with any other non-OK code
    #[error("{endpoint} rejected message {message:#x}: {status}")]
    SmuRejected {
        /// Mailbox the message was sent to
        endpoint: EndpointKind,
        /// Message id
        message: u32,
        /// Response code
        status: Status,
    },

    /// Physical memory or register window not accessible
    #[error("Memory access failed: {reason}")]
    MemoryAccess {
        /// Reason for failure
        reason: String,
    },

    /// The requested mailbox failed its probe or was never resolved
    #[error("{endpoint} mailbox unavailable")]
    MailboxUnavailable {
        /// Missing mailbox
        endpoint: EndpointKind,
    },

    /// Neither mailbox answered its probe
    #[error("No SMU mailbox answered (read-only bus or unsupported firmware)")]
    NoMailbox,

    /// Backend could not be opened
    #[error("Backend unavailable: {reason}")]
    BackendUnavailable {
        /// Reason for failure
        reason: String,
    },

    /// Driver files present but not usable
    #[error("Unsupported ryzen_smu driver at {path}: {reason}")]
    DriverVersion {
        /// Driver sysfs root
        path: PathBuf,
        /// What was wrong with it
        reason: String,
    },

    /// I/O error during register or table access
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error
        #[from]
        source: std::io::Error,
    },
}

impl SmuError {
    /// Create a family unsupported error
    pub fn family_unsupported(family: Family, operation: impl Into<String>) -> Self {
        Self::FamilyUnsupported {
            family,
            operation: operation.into(),
        }
    }

    /// Create a memory access error
    pub fn memory_access(reason: impl Into<String>) -> Self {
        Self::MemoryAccess {
            reason: reason.into(),
        }
    }

    /// Create a backend unavailable error
    pub fn backend_unavailable(reason: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            reason: reason.into(),
        }
    }

    /// Create a driver version error
    pub fn driver_version(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::DriverVersion {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Numeric code used by the C-compatible API and the CLI exit status.
    pub const fn code(&self) -> i32 {
        match self {
            Self::FamilyUnsupported { .. } => ADJ_ERR_FAM_UNSUPPORTED,
            Self::SmuTimeout { .. } => ADJ_ERR_SMU_TIMEOUT,
            Self::SmuUnsupported { .. }
            | Self::MailboxUnavailable { .. }
            | Self::NoMailbox => ADJ_ERR_SMU_UNSUPPORTED,
            Self::SmuRejected { .. } => ADJ_ERR_SMU_REJECTED,
            Self::MemoryAccess { .. }
            | Self::BackendUnavailable { .. }
            | Self::DriverVersion { .. }
            | Self::Io { .. } => ADJ_ERR_MEMORY_ACCESS,
        }
    }

    /// `true` when the SMU itself answered (as opposed to a timeout or I/O fault).
    pub const fn is_smu_reply(&self) -> bool {
        matches!(self, Self::SmuUnsupported { .. } | Self::SmuRejected { .. })
    }
}
