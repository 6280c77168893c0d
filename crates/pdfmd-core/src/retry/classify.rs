//! Classify job errors into retry policy failure kinds.

use crate::engine::JobError;

use super::policy::FailureKind;

/// Map a job error to a failure kind for the retry decision. Only
/// scheduler-side I/O carries enough structure to detect the one
/// transient case (a missing output directory); engine failures are
/// opaque strings and never retried.
pub fn classify(error: &JobError) -> FailureKind {
    match error {
        JobError::Io(e) if e.kind() == std::io::ErrorKind::NotFound => {
            FailureKind::MissingOutputDir
        }
        JobError::Io(_) => FailureKind::DiskIo,
        JobError::ResourceExhaustion(_) => FailureKind::ResourceExhaustion,
        JobError::Engine(_) => FailureKind::Engine,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn not_found_is_missing_output_dir() {
        let err = JobError::Io(io::Error::new(io::ErrorKind::NotFound, "no such directory"));
        assert_eq!(classify(&err), FailureKind::MissingOutputDir);
    }

    #[test]
    fn other_io_is_disk_io() {
        let err = JobError::Io(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
        assert_eq!(classify(&err), FailureKind::DiskIo);
    }

    #[test]
    fn engine_and_allocation_failures_keep_their_kind() {
        assert_eq!(
            classify(&JobError::Engine("bad xref table".into())),
            FailureKind::Engine
        );
        assert_eq!(
            classify(&JobError::ResourceExhaustion("page buffer".into())),
            FailureKind::ResourceExhaustion
        );
    }
}
