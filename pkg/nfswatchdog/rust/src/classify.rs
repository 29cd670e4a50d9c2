// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::error::Error as StdError;
use std::fmt;
use std::io;

use log::error;
use nix::errno::Errno;

/// OS error codes that mean the remote end of the mount is gone or unusable.
const STALE_MOUNT_ERRNOS: &[Errno] = &[
    Errno::ESTALE,
    Errno::ENOTCONN,
    Errno::EIO,
    Errno::EACCES,
    Errno::EHOSTDOWN,
    Errno::EWOULDBLOCK,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Corrupted,
    NotCorrupted,
}

impl Classification {
    pub fn is_corrupted(self) -> bool {
        self == Classification::Corrupted
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Corrupted => write!(f, "corrupted"),
            Classification::NotCorrupted => write!(f, "not corrupted"),
        }
    }
}

/// Decide whether a probe error is a known stale-mount signal.
///
/// Only the allow-listed OS codes count. Errors without an OS code anywhere
/// in their chain (timeouts, unknown error types) are `NotCorrupted`.
pub fn classify(err: Option<&(dyn StdError + 'static)>) -> Classification {
    let Some(err) = err else {
        return Classification::NotCorrupted;
    };

    error!("Encountered error checking filesystem: {err}");

    match underlying_errno(err) {
        Some(errno) if STALE_MOUNT_ERRNOS.contains(&errno) => Classification::Corrupted,
        _ => Classification::NotCorrupted,
    }
}

/// Peel wrapping layers until an OS error code shows up.
///
/// `io::Error` hides a custom payload from `source()`, so it is unwrapped
/// through `get_ref` instead.
fn underlying_errno(err: &(dyn StdError + 'static)) -> Option<Errno> {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(errno) = e.downcast_ref::<Errno>() {
            return Some(*errno);
        }
        if let Some(io_err) = e.downcast_ref::<io::Error>() {
            if let Some(code) = io_err.raw_os_error() {
                return Some(Errno::from_raw(code));
            }
            if let Some(inner) = io_err.get_ref() {
                let inner: &(dyn StdError + 'static) = inner;
                current = Some(inner);
                continue;
            }
        }
        current = e.source();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::ProbeError;
    use std::path::PathBuf;

    fn os_error(errno: Errno) -> io::Error {
        io::Error::from_raw_os_error(errno as i32)
    }

    fn classify_io(err: &io::Error) -> Classification {
        classify(Some(err))
    }

    #[derive(Debug, thiserror::Error)]
    #[error("syscall {call} failed")]
    struct SyscallError {
        call: &'static str,
        #[source]
        source: Errno,
    }

    #[test]
    fn test_absent_error_is_not_corrupted() {
        assert_eq!(classify(None), Classification::NotCorrupted);
    }

    #[test]
    fn test_raw_os_errors_in_allow_list() {
        for errno in STALE_MOUNT_ERRNOS {
            assert!(
                classify_io(&os_error(*errno)).is_corrupted(),
                "{errno} should be a stale mount signal"
            );
        }
    }

    #[test]
    fn test_bare_errno() {
        assert!(classify(Some(&Errno::ESTALE)).is_corrupted());
        assert!(!classify(Some(&Errno::ENOENT)).is_corrupted());
    }

    #[test]
    fn test_path_wrapped_stale_handle() {
        let err = ProbeError::new(PathBuf::from("/mnt/nfs"), os_error(Errno::ESTALE));
        assert_eq!(classify(Some(&err)), Classification::Corrupted);
    }

    #[test]
    fn test_io_custom_wrapping() {
        let err = io::Error::other(os_error(Errno::EHOSTDOWN));
        assert!(classify_io(&err).is_corrupted());
    }

    #[test]
    fn test_syscall_wrapped_errno() {
        let err = SyscallError {
            call: "getdents64",
            source: Errno::ENOTCONN,
        };
        assert!(classify(Some(&err)).is_corrupted());
    }

    #[test]
    fn test_several_layers_of_wrapping() {
        let inner = SyscallError {
            call: "openat",
            source: Errno::EIO,
        };
        let err = ProbeError::new(PathBuf::from("/mnt/nfs"), io::Error::other(inner));
        assert!(classify(Some(&err)).is_corrupted());
    }

    #[test]
    fn test_would_block_matches_eagain() {
        assert!(classify_io(&os_error(Errno::EAGAIN)).is_corrupted());
    }

    #[test]
    fn test_codes_outside_allow_list() {
        for errno in [Errno::ENOENT, Errno::ENOTDIR, Errno::EMFILE, Errno::EINTR] {
            let err = ProbeError::new(PathBuf::from("/mnt/nfs"), os_error(errno));
            assert_eq!(
                classify(Some(&err)),
                Classification::NotCorrupted,
                "{errno} should not be a stale mount signal"
            );
        }
    }

    #[test]
    fn test_error_without_os_code() {
        let err = io::Error::new(io::ErrorKind::TimedOut, "probe deadline exceeded");
        assert!(!classify_io(&err).is_corrupted());

        let err = io::Error::from(io::ErrorKind::PermissionDenied);
        assert!(
            !classify_io(&err).is_corrupted(),
            "only OS codes are matched, not error kinds"
        );
    }

    #[test]
    fn test_classification_is_stable() {
        let err = os_error(Errno::ESTALE);
        assert_eq!(classify_io(&err), classify_io(&err));
    }
}
