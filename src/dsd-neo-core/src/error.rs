// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Error kinds for the core engine, per the error-handling design.
//!
//! Local recovery is preferred throughout: only [`CoreError::Shutdown`]
//! and unrecoverable [`CoreError::Transport`] failures are meant to
//! propagate past a single call site.

use thiserror::Error;

/// Error kinds produced by the core engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Channel could not be resolved to a frequency (missing/untrusted IDEN).
    #[error("unresolved channel 0x{channel16:04x}")]
    Resolution { channel16: u16 },

    /// Grant or release blocked by policy (ENC lockout, block list, allow list miss).
    #[error("policy denied: {reason}")]
    Policy { reason: String },

    /// A hold window elapsed without the expected sync.
    #[error("timed out waiting for {what}")]
    Timeout { what: String },

    /// Socket, rigctl, or RTL stream I/O failure.
    #[error("transport error: {message}")]
    Transport { message: String },

    /// The global exit flag was observed; blocking primitive returned early.
    #[error("shutdown in progress")]
    Shutdown,
}

impl CoreError {
    /// Whether the caller should retry rather than give up outright.
    ///
    /// Mirrors the transient/permanent split used elsewhere in this
    /// ecosystem's retry policies: timeouts and transport hiccups are
    /// worth another attempt, protocol and policy failures are not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CoreError::Timeout { .. } | CoreError::Transport { .. }
        )
    }

    pub fn resolution(channel16: u16) -> Self {
        CoreError::Resolution { channel16 }
    }

    pub fn policy(reason: impl Into<String>) -> Self {
        CoreError::Policy {
            reason: reason.into(),
        }
    }

    pub fn timeout(what: impl Into<String>) -> Self {
        CoreError::Timeout { what: what.into() }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        CoreError::Transport {
            message: message.into(),
        }
    }
}
