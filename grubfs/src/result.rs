// SPDX-License-Identifier: MIT OR Apache-2.0

//! Translation of driver error codes into UEFI status codes.

use grubfs_raw::GrubErr;
use uefi::Status;

/// Return type of driver operations that produce a value.
///
/// The error is never [`GrubErr::NONE`].
pub type GrubResult<T = ()> = core::result::Result<T, GrubErr>;

/// Status reported for driver codes that have no specific translation.
///
/// No named [`GrubErr`] translates to this status, so a host seeing it knows
/// the driver reported something outside of the known set.
pub const UNMAPPED_STATUS: Status = Status::ABORTED;

/// Extension trait which provides the host view of a [`GrubErr`].
pub trait GrubErrExt {
    /// Translates this driver code into a UEFI status.
    ///
    /// [`GrubErr::NONE`] becomes [`Status::SUCCESS`], every other named code
    /// becomes a specific error status and anything else becomes
    /// [`UNMAPPED_STATUS`].
    fn to_status(self) -> Status;

    /// Converts this driver code into a [`uefi::Result`].
    fn to_result(self) -> uefi::Result;
}

impl GrubErrExt for GrubErr {
    fn to_status(self) -> Status {
        match self {
            Self::NONE => Status::SUCCESS,
            Self::TEST_FAILURE => Status::INVALID_PARAMETER,
            Self::BAD_MODULE => Status::LOAD_ERROR,
            Self::OUT_OF_MEMORY => Status::OUT_OF_RESOURCES,
            Self::BAD_FILE_TYPE => Status::NO_MAPPING,
            Self::FILE_NOT_FOUND => Status::NOT_FOUND,
            Self::FILE_READ_ERROR => Status::NO_RESPONSE,
            Self::BAD_FILENAME => Status::INVALID_PARAMETER,
            Self::UNKNOWN_FS => Status::UNSUPPORTED,
            Self::BAD_FS => Status::VOLUME_CORRUPTED,
            Self::BAD_PART_TABLE => Status::VOLUME_CORRUPTED,
            Self::UNKNOWN_DEVICE => Status::NO_MEDIA,
            Self::BAD_DEVICE => Status::DEVICE_ERROR,
            Self::READ_ERROR => Status::DEVICE_ERROR,
            Self::WRITE_ERROR => Status::WRITE_PROTECTED,
            Self::UNKNOWN_COMMAND => Status::UNSUPPORTED,
            Self::INVALID_COMMAND => Status::INVALID_PARAMETER,
            Self::BAD_ARGUMENT => Status::INVALID_PARAMETER,
            Self::BAD_NUMBER => Status::INVALID_PARAMETER,
            Self::UNKNOWN_OS => Status::UNSUPPORTED,
            Self::BAD_OS => Status::UNSUPPORTED,
            Self::NO_KERNEL => Status::NOT_FOUND,
            Self::BAD_FONT => Status::UNSUPPORTED,
            Self::NOT_IMPLEMENTED_YET => Status::UNSUPPORTED,
            Self::SYMLINK_LOOP => Status::INVALID_PARAMETER,
            Self::BAD_COMPRESSED_DATA => Status::CRC_ERROR,
            Self::MENU => Status::NOT_READY,
            Self::TIMEOUT => Status::TIMEOUT,
            Self::IO => Status::DEVICE_ERROR,
            Self::ACCESS_DENIED => Status::ACCESS_DENIED,
            Self::EXTRACTOR => Status::LOAD_ERROR,
            Self::NET_BAD_ADDRESS => Status::INVALID_PARAMETER,
            Self::NET_ROUTE_LOOP => Status::PROTOCOL_ERROR,
            Self::NET_NO_ROUTE => Status::NO_MAPPING,
            Self::NET_NO_ANSWER => Status::NO_RESPONSE,
            Self::NET_NO_CARD => Status::NOT_STARTED,
            Self::WAIT => Status::NOT_READY,
            Self::BUG => Status::DEVICE_ERROR,
            Self::NET_PORT_CLOSED => Status::NO_RESPONSE,
            Self::NET_INVALID_RESPONSE => Status::PROTOCOL_ERROR,
            Self::NET_UNKNOWN_ERROR => Status::PROTOCOL_ERROR,
            Self::NET_PACKET_TOO_BIG => Status::BAD_BUFFER_SIZE,
            Self::NET_NO_DOMAIN => Status::NOT_FOUND,
            Self::EOF => Status::END_OF_FILE,
            Self::BAD_SIGNATURE => Status::SECURITY_VIOLATION,
            _ => UNMAPPED_STATUS,
        }
    }

    #[inline]
    fn to_result(self) -> uefi::Result {
        let status = self.to_status();
        if status.is_success() {
            Ok(())
        } else {
            Err(status.into())
        }
    }
}

/// Converts a driver result into a host result.
///
/// A driver error that claims success is still a failure for the host and
/// becomes [`UNMAPPED_STATUS`].
pub(crate) fn to_uefi<T>(result: GrubResult<T>) -> uefi::Result<T> {
    result.map_err(|err| match err.to_status() {
        status if status.is_success() => UNMAPPED_STATUS.into(),
        status => status.into(),
    })
}
