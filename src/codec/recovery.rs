//! Recovery policy types for codec error handling.
//!
//! When a codec error occurs, the consumer applies a recovery policy:
//!
//! - [`RecoveryPolicy::Drop`]: Discard the malformed message and continue with the next frame.
//! - [`RecoveryPolicy::Disconnect`]: Abandon the stream. Required once frame synchronisation is
//!   lost or the stream ended mid-frame.
//!
//! Consumers can override the defaults with a [`RecoveryPolicyHook`].
//!
//! ```
//! use eventframe::codec::{CodecError, RecoveryPolicy, RecoveryPolicyHook};
//!
//! struct Strict;
//!
//! impl RecoveryPolicyHook for Strict {
//!     fn recovery_policy(&self, _error: &CodecError) -> RecoveryPolicy {
//!         RecoveryPolicy::Disconnect
//!     }
//! }
//! ```

use super::error::CodecError;

/// Recovery policies for codec errors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RecoveryPolicy {
    /// Discard the offending message and continue processing.
    ///
    /// Checksum failures, length mismatches and malformed header blocks
    /// affect a single, fully delimited message.
    #[default]
    Drop,

    /// Stop consuming the stream.
    Disconnect,
}

/// Hook for customising the policy applied to a codec error.
pub trait RecoveryPolicyHook: Send + Sync {
    /// Choose the policy for `error`. Defaults to
    /// [`CodecError::default_recovery_policy`].
    fn recovery_policy(&self, error: &CodecError) -> RecoveryPolicy {
        error.default_recovery_policy()
    }
}

/// Hook that applies the built-in defaults.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultRecoveryPolicy;

impl RecoveryPolicyHook for DefaultRecoveryPolicy {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{ChecksumKind, FramingError};

    struct AlwaysDisconnect;

    impl RecoveryPolicyHook for AlwaysDisconnect {
        fn recovery_policy(&self, _error: &CodecError) -> RecoveryPolicy {
            RecoveryPolicy::Disconnect
        }
    }

    fn checksum_error() -> CodecError {
        CodecError::Framing(FramingError::ChecksumMismatch {
            kind: ChecksumKind::Message,
            expected: 1,
            actual: 2,
        })
    }

    #[test]
    fn default_hook_defers_to_error() {
        assert_eq!(
            DefaultRecoveryPolicy.recovery_policy(&checksum_error()),
            RecoveryPolicy::Drop
        );
    }

    #[test]
    fn custom_hook_overrides_default() {
        assert_eq!(
            AlwaysDisconnect.recovery_policy(&checksum_error()),
            RecoveryPolicy::Disconnect
        );
    }
}
