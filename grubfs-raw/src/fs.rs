// SPDX-License-Identifier: MIT OR Apache-2.0

//! Types exchanged with a driver while enumerating a directory.

use bitflags::bitflags;

bitflags! {
    /// Which facts a driver filled in for a directory entry.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
    #[repr(transparent)]
    pub struct DirhookFlags: u32 {
        /// The entry is a directory.
        const DIR = 1 << 0;
        /// [`DirhookInfo::mtime`] is valid.
        const MTIME_SET = 1 << 1;
        /// Names on this filesystem compare case-insensitively.
        const CASE_INSENSITIVE = 1 << 2;
        /// [`DirhookInfo::inode`] is valid.
        const INODE_SET = 1 << 3;
        /// The entry is a symbolic link.
        const SYMLINK = 1 << 4;
    }
}

/// Information a driver passes to the directory hook for each entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DirhookInfo {
    /// Which of the remaining fields are meaningful.
    pub flags: DirhookFlags,
    /// Modification time in seconds since the Unix epoch.
    pub mtime: i64,
    /// Driver-specific inode number.
    pub inode: u64,
}

impl DirhookInfo {
    /// Info for a plain directory entry without timestamps or inode.
    #[must_use]
    pub const fn directory() -> Self {
        Self {
            flags: DirhookFlags::DIR,
            mtime: 0,
            inode: 0,
        }
    }

    /// Info for a plain file entry without timestamps or inode.
    #[must_use]
    pub const fn file() -> Self {
        Self {
            flags: DirhookFlags::empty(),
            mtime: 0,
            inode: 0,
        }
    }

    /// Returns true if the entry is a directory.
    #[must_use]
    pub const fn is_dir(&self) -> bool {
        self.flags.contains(DirhookFlags::DIR)
    }

    /// Modification time, if the driver provided one.
    #[must_use]
    pub const fn mtime(&self) -> Option<i64> {
        if self.flags.contains(DirhookFlags::MTIME_SET) {
            Some(self.mtime)
        } else {
            None
        }
    }

    /// Inode number, if the driver provided one.
    #[must_use]
    pub const fn inode(&self) -> Option<u64> {
        if self.flags.contains(DirhookFlags::INODE_SET) {
            Some(self.inode)
        } else {
            None
        }
    }
}
