//! Error types for the effect host.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HostError {
    #[error("failed to load effect module {path}: {reason}")]
    LoadFailed { path: PathBuf, reason: String },

    #[error("module at {path} is not a VST effect (magic {magic:#010x})")]
    IdentityMismatch { path: PathBuf, magic: i32 },

    #[error("program index {requested} out of range (effect declares {count})")]
    ProgramOutOfRange { requested: i32, count: i32 },

    #[error("decoded parameter vector has {got} values, effect declares {expected}")]
    StateSizeMismatch { expected: usize, got: usize },

    #[error("state string is not valid base64: {0}")]
    StateDecode(#[from] base64::DecodeError),

    #[error("failed to open effect library: {0}")]
    Library(#[from] libloading::Error),
}

pub type Result<T> = std::result::Result<T, HostError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_failed_display() {
        let err = HostError::LoadFailed {
            path: PathBuf::from("/plugins/verb.so"),
            reason: "no entry point".to_string(),
        };
        assert!(err.to_string().contains("/plugins/verb.so"));
        assert!(err.to_string().contains("no entry point"));
    }

    #[test]
    fn test_identity_mismatch_display() {
        let err = HostError::IdentityMismatch {
            path: PathBuf::from("/plugins/bogus.so"),
            magic: 0x0000_0000,
        };
        assert!(err.to_string().contains("not a VST effect"));
        assert!(err.to_string().contains("0x00000000"));
    }

    #[test]
    fn test_state_size_mismatch_display() {
        let err = HostError::StateSizeMismatch {
            expected: 8,
            got: 3,
        };
        assert!(err.to_string().contains('8'));
        assert!(err.to_string().contains('3'));
    }
}
