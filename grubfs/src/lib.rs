// SPDX-License-Identifier: MIT OR Apache-2.0

//! Run a GRUB-style filesystem driver behind the UEFI Simple File System
//! model.
//!
//! A filesystem driver written for the GRUB driver interface thinks in
//! devices, disks and files and reads raw 512-byte sectors. A UEFI file
//! system driver has to answer in terms of block I/O handles, file protocol
//! instances with a size and position, directory enumeration and status
//! codes. This crate is the seam between the two: it lets such a driver run
//! unmodified as the backend of a UEFI file system.
//!
//! # Overview
//!
//! - [`Bridge`] owns the single [`FsDriver`] of the image and its [`Env`].
//!   It mounts [`Volume`]s, creates and destroys [`HostFile`]s and forwards
//!   open, read, close, directory enumeration, label, UUID and probe calls
//!   to the driver.
//! - [`Device`] and [`Disk`] are what the driver addresses a volume by. The
//!   disk points back at the volume without owning it, and
//!   [`Disk::read`] turns sector reads into byte reads on the host's
//!   [`BlockDevice`].
//! - [`HostFile`] pairs the host's dispatch table with the driver's
//!   [`DriverFile`], which tracks size and offset.
//! - [`GrubErrExt`] translates driver error codes into [`uefi::Status`].
//!
//! The host glue (driver binding, protocol installation and the
//! `extern "efiapi"` entry points) lives outside of this crate and calls
//! into the [`Bridge`].
//!
//! # Example
//!
//! ```
//! use grubfs::{Bridge, Device, DirHook, DriverFile, Env, FsDriver, GrubResult};
//!
//! /// A driver that recognizes nothing.
//! struct NullFs;
//!
//! impl FsDriver for NullFs {
//!     const NAME: &'static str = "null";
//!
//!     fn open(&self, env: &Env, _: &mut DriverFile, path: &str) -> GrubResult {
//!         Err(env.error(grubfs::GrubErr::FILE_NOT_FOUND, format_args!("{path}")))
//!     }
//!     fn read(&self, _: &Env, _: &mut DriverFile, _: &mut [u8]) -> isize {
//!         -1
//!     }
//!     fn close(&self, _: &Env, _: &mut DriverFile) {}
//!     fn dir(&self, env: &Env, _: &Device, _: &str, _: &mut DirHook<'_>) -> GrubResult {
//!         Err(env.error(grubfs::GrubErr::UNKNOWN_FS, format_args!("not a null filesystem")))
//!     }
//!     fn label(&self, _: &Env, _: &Device) -> GrubResult<Option<String>> {
//!         Ok(None)
//!     }
//!     fn uuid(&self, _: &Env, _: &Device) -> GrubResult<Option<String>> {
//!         Ok(None)
//!     }
//! }
//!
//! let bridge = Bridge::new(NullFs);
//! assert_eq!(bridge.env().errno(), grubfs::GrubErr::NONE);
//! ```
//!
//! # Concurrency
//!
//! Everything here runs to completion on the caller's thread. The [`Env`] is
//! neither `Send` nor `Sync`; a host with several threads must serialize
//! access to a [`Bridge`] itself.
//!
//! # Crate Features
//!
//! - `efi` (default): [`EfiBlockDevice`], a [`BlockDevice`] on top of the
//!   UEFI disk I/O and block I/O protocols.
//!
//! Logging goes through the [`log`] facade. The image installs the logger
//! and chooses the verbosity.

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![no_std]
// Enable some additional warnings and lints.
#![warn(clippy::ptr_as_ptr, missing_docs, unused)]
#![deny(clippy::all)]
#![deny(clippy::must_use_candidate)]
#![deny(missing_debug_implementations)]

extern crate alloc;

pub mod disk;
pub mod driver;
pub mod env;
pub mod file;
pub mod path;

mod bridge;
#[cfg(feature = "efi")]
mod efi;
mod result;
mod uuid;

pub use bridge::{Bridge, FileSystem};
pub use disk::{BlockDevice, Device, DeviceId, Disk, Volume};
pub use driver::{DirHook, FsDriver};
#[cfg(feature = "efi")]
pub use efi::EfiBlockDevice;
pub use env::Env;
pub use file::{DriverFile, HostFile};
pub use grubfs_raw::{DirhookFlags, DirhookInfo, GrubErr, DISK_SECTOR_SIZE};
pub use result::{GrubErrExt, GrubResult, UNMAPPED_STATUS};
pub use uuid::{VolumeUuid, UUID_MAX_CHARS};
