// SPDX-License-Identifier: MIT OR Apache-2.0

//! Volumes, devices and the disk read path.
//!
//! A [`Volume`] is the host side of a mounted block device. Drivers never see
//! it directly: they receive a [`Device`] whose [`Disk`] points back at the
//! volume without owning it, and read raw bytes through [`Disk::read`].

use crate::env::Env;
use crate::result::GrubResult;
use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::string::String;
use core::fmt::{self, Debug, Formatter};
use grubfs_raw::{DiskAddr, GrubErr, DISK_SECTOR_SIZE};
use log::{error, trace};

/// Byte-addressed access to the host's block media.
///
/// Retrying failed transfers is up to the implementation. The disk read path
/// issues every request exactly once.
pub trait BlockDevice {
    /// Identifier of the medium currently in the device, or `None` if the
    /// host has no block descriptor for it.
    fn media_id(&self) -> Option<u32>;

    /// Reads `buffer.len()` bytes starting at byte `offset` of the medium
    /// identified by `media_id`.
    fn read_disk(&self, media_id: u32, offset: u64, buffer: &mut [u8]) -> uefi::Result;
}

/// Host-side backing of one mounted volume.
pub struct Volume {
    key: String,
    io: Option<Box<dyn BlockDevice>>,
}

impl Volume {
    /// Creates a volume named `key`, reading through `io`.
    ///
    /// `key` must be stable for the lifetime of the volume, the textual form
    /// of the device path is a good choice. Passing `None` for `io` models a
    /// host that could not provide block access; every read then fails.
    #[must_use]
    pub fn new(key: impl Into<String>, io: Option<Box<dyn BlockDevice>>) -> Self {
        Self {
            key: key.into(),
            io,
        }
    }

    /// Name under which drivers can open this volume.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Block access of this volume, if the host provided one.
    #[must_use]
    pub fn io(&self) -> Option<&dyn BlockDevice> {
        self.io.as_deref()
    }
}

impl Debug for Volume {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Volume")
            .field("key", &self.key)
            .field("io", &self.io.is_some())
            .finish()
    }
}

/// How a device to open is identified.
#[derive(Clone, Copy, Debug)]
pub enum DeviceId<'a> {
    /// The volume is known to the caller, as it is when the host mounts it.
    Volume(&'a Rc<Volume>),
    /// A name a driver found on disk, resolved through the [`Env`] table.
    Name(&'a str),
}

/// Driver-facing handle of one volume.
#[derive(Debug)]
pub struct Device {
    disk: Disk,
}

/// The block medium of a [`Device`].
#[derive(Debug)]
pub struct Disk {
    volume: Weak<Volume>,
    name: String,
}

impl Device {
    /// Opens a device on the volume identified by `id`.
    ///
    /// Fails with [`GrubErr::UNKNOWN_DEVICE`] if a name does not resolve to a
    /// live volume and with [`GrubErr::OUT_OF_MEMORY`] if the device cannot be
    /// allocated. Either way nothing is left behind.
    pub fn open(env: &Env, id: DeviceId<'_>) -> GrubResult<Self> {
        let volume = match id {
            DeviceId::Volume(volume) => Rc::clone(volume),
            DeviceId::Name(name) => env.lookup_volume(name).ok_or_else(|| {
                env.error(
                    GrubErr::UNKNOWN_DEVICE,
                    format_args!("no such device: {name}"),
                )
            })?,
        };

        let mut name = String::new();
        name.try_reserve_exact(volume.key().len()).map_err(|_| {
            env.error(
                GrubErr::OUT_OF_MEMORY,
                format_args!("out of memory opening {}", volume.key()),
            )
        })?;
        name.push_str(volume.key());

        trace!("opened device {name}");
        Ok(Self {
            disk: Disk {
                volume: Rc::downgrade(&volume),
                name,
            },
        })
    }

    /// Closes the device, releasing its disk along with it.
    pub fn close(self) {
        trace!("closing device {}", self.disk.name);
        let Self { disk } = self;
        drop(disk);
    }

    /// The disk of this device.
    #[must_use]
    pub const fn disk(&self) -> &Disk {
        &self.disk
    }
}

impl Disk {
    /// Name of the volume this disk reads from.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The volume this disk reads from, if it is still mounted.
    #[must_use]
    pub fn volume(&self) -> Option<Rc<Volume>> {
        self.volume.upgrade()
    }

    /// Returns true if this disk points back at `volume`.
    #[must_use]
    pub fn belongs_to(&self, volume: &Rc<Volume>) -> bool {
        Weak::ptr_eq(&self.volume, &Rc::downgrade(volume))
    }

    /// Reads `buf.len()` bytes starting `offset` bytes into `sector`.
    ///
    /// The sector size is always [`DISK_SECTOR_SIZE`], whatever the block
    /// size of the media. The request goes to the host exactly once. A
    /// missing volume, block access or block descriptor, an address that
    /// does not fit in 64 bits and a host failure all raise
    /// [`GrubErr::READ_ERROR`].
    pub fn read(&self, env: &Env, sector: DiskAddr, offset: u64, buf: &mut [u8]) -> GrubResult {
        let Some(volume) = self.volume.upgrade() else {
            return Err(env.error(
                GrubErr::READ_ERROR,
                format_args!("{}: volume is gone", self.name),
            ));
        };
        let Some(io) = volume.io() else {
            return Err(env.error(
                GrubErr::READ_ERROR,
                format_args!("{}: no block access", self.name),
            ));
        };
        let Some(media_id) = io.media_id() else {
            return Err(env.error(
                GrubErr::READ_ERROR,
                format_args!("{}: no block media", self.name),
            ));
        };
        let Some(address) = sector
            .checked_mul(DISK_SECTOR_SIZE)
            .and_then(|a| a.checked_add(offset))
        else {
            return Err(env.error(
                GrubErr::READ_ERROR,
                format_args!("{}: sector {sector:#x} is out of range", self.name),
            ));
        };

        io.read_disk(media_id, address, buf).map_err(|e| {
            error!(
                "Could not read block at address {sector:08x}: {:?}",
                e.status()
            );
            env.error(
                GrubErr::READ_ERROR,
                format_args!("{}: failure reading sector {sector:#x}", self.name),
            )
        })
    }
}
