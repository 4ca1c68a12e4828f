// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`BlockDevice`] on top of the UEFI disk I/O and block I/O protocols.

use crate::disk::BlockDevice;
use core::fmt::{self, Debug, Formatter};
use core::ops::Deref;
use uefi::proto::media::block::BlockIO;
use uefi::proto::media::disk::DiskIo;

/// Block access through a [`DiskIo`] protocol, with the media identity taken
/// from the matching [`BlockIO`] protocol.
///
/// Both protocols are usually held as [`uefi::boot::ScopedProtocol`]s opened
/// on the controller handle the driver was bound to.
pub struct EfiBlockDevice<D, B> {
    disk_io: D,
    block_io: Option<B>,
}

impl<D, B> EfiBlockDevice<D, B>
where
    D: Deref<Target = DiskIo>,
    B: Deref<Target = BlockIO>,
{
    /// Creates a block device. Without `block_io` every read fails before
    /// reaching the disk, since the media identity is unknown.
    #[must_use]
    pub const fn new(disk_io: D, block_io: Option<B>) -> Self {
        Self { disk_io, block_io }
    }
}

impl<D, B> BlockDevice for EfiBlockDevice<D, B>
where
    D: Deref<Target = DiskIo>,
    B: Deref<Target = BlockIO>,
{
    fn media_id(&self) -> Option<u32> {
        self.block_io.as_ref().map(|b| b.media().media_id())
    }

    fn read_disk(&self, media_id: u32, offset: u64, buffer: &mut [u8]) -> uefi::Result {
        self.disk_io.read_disk(media_id, offset, buffer)
    }
}

impl<D, B> Debug for EfiBlockDevice<D, B> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("EfiBlockDevice")
            .field("block_io", &self.block_io.is_some())
            .finish_non_exhaustive()
    }
}
