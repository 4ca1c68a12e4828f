// SPDX-License-Identifier: MIT OR Apache-2.0

use core::fmt::{self, Debug, Display, Formatter};

newtype_enum! {
/// Error code reported by a filesystem driver.
///
/// Drivers may report values outside of the named set, so the constants are
/// not a comprehensive list of all possible values.
#[must_use]
pub enum GrubErr: i32 => {
    /// The operation completed successfully.
    NONE                  =  0,
    /// A test condition evaluated to false.
    TEST_FAILURE          =  1,
    /// A module could not be loaded.
    BAD_MODULE            =  2,
    /// A memory allocation failed.
    OUT_OF_MEMORY         =  3,
    /// The file is not of the expected type.
    BAD_FILE_TYPE         =  4,
    /// The file or directory does not exist.
    FILE_NOT_FOUND        =  5,
    /// Reading the contents of a file failed.
    FILE_READ_ERROR       =  6,
    /// The path is malformed.
    BAD_FILENAME          =  7,
    /// The volume does not hold a filesystem this driver knows.
    UNKNOWN_FS            =  8,
    /// The filesystem structures are inconsistent.
    BAD_FS                =  9,
    /// The partition table is invalid.
    BAD_PART_TABLE        = 10,
    /// The named device does not exist.
    UNKNOWN_DEVICE        = 11,
    /// The device is unusable.
    BAD_DEVICE            = 12,
    /// Reading from the underlying media failed.
    READ_ERROR            = 13,
    /// Writing to the underlying media failed.
    WRITE_ERROR           = 14,
    /// The command is unknown.
    UNKNOWN_COMMAND       = 15,
    /// The command was invoked incorrectly.
    INVALID_COMMAND       = 16,
    /// An argument was invalid.
    BAD_ARGUMENT          = 17,
    /// A number could not be parsed.
    BAD_NUMBER            = 18,
    /// The operating system is unknown.
    UNKNOWN_OS            = 19,
    /// The operating system image is invalid.
    BAD_OS                = 20,
    /// No kernel was loaded.
    NO_KERNEL             = 21,
    /// The font file is invalid.
    BAD_FONT              = 22,
    /// The operation is not implemented.
    NOT_IMPLEMENTED_YET   = 23,
    /// Too many levels of symbolic links.
    SYMLINK_LOOP          = 24,
    /// Decompression failed.
    BAD_COMPRESSED_DATA   = 25,
    /// Menu error.
    MENU                  = 26,
    /// A timeout expired.
    TIMEOUT               = 27,
    /// Generic I/O error.
    IO                    = 28,
    /// Access was denied.
    ACCESS_DENIED         = 29,
    /// An archive extractor failed.
    EXTRACTOR             = 30,
    /// A network address is invalid.
    NET_BAD_ADDRESS       = 31,
    /// A network route loops.
    NET_ROUTE_LOOP        = 32,
    /// No route to the network destination.
    NET_NO_ROUTE          = 33,
    /// The network peer did not answer.
    NET_NO_ANSWER         = 34,
    /// No network card is available.
    NET_NO_CARD           = 35,
    /// The operation must be retried later.
    WAIT                  = 36,
    /// Internal driver bug.
    BUG                   = 37,
    /// The network port is closed.
    NET_PORT_CLOSED       = 38,
    /// The network peer sent an invalid response.
    NET_INVALID_RESPONSE  = 39,
    /// Unknown network error.
    NET_UNKNOWN_ERROR     = 40,
    /// A network packet was too big.
    NET_PACKET_TOO_BIG    = 41,
    /// The network domain could not be resolved.
    NET_NO_DOMAIN         = 42,
    /// The end of the file was reached.
    EOF                   = 43,
    /// A signature check failed.
    BAD_SIGNATURE         = 44,
}}

impl GrubErr {
    /// Largest code with a named constant.
    pub const LAST: Self = Self::BAD_SIGNATURE;

    /// Returns true if this is not [`GrubErr::NONE`].
    #[inline]
    #[must_use]
    pub const fn is_err(self) -> bool {
        self.0 != Self::NONE.0
    }

    /// Returns true if the code is one of the named constants.
    #[inline]
    #[must_use]
    pub const fn is_known(self) -> bool {
        self.0 >= Self::NONE.0 && self.0 <= Self::LAST.0
    }
}

impl Default for GrubErr {
    fn default() -> Self {
        Self::NONE
    }
}

impl Display for GrubErr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(self, f)
    }
}

impl core::error::Error for GrubErr {}
