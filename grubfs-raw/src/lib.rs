// SPDX-License-Identifier: MIT OR Apache-2.0

//! Raw types of the GRUB filesystem driver interface.
//!
//! A filesystem driver written against this interface addresses a volume
//! through a device, reads raw bytes in fixed-size sectors, reports failures
//! as [`GrubErr`] codes and walks directories through a hook receiving a
//! [`DirhookInfo`] per entry.
//!
//! This crate only holds the data types. The [`grubfs`] crate implements the
//! objects drivers operate on and adapts them to a UEFI host.
//!
//! [`grubfs`]: https://docs.rs/grubfs

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![deny(
    clippy::all,
    clippy::must_use_candidate,
    clippy::use_self,
    missing_debug_implementations,
    unused
)]

#[cfg(test)]
extern crate alloc;

#[macro_use]
mod enums;

mod err;
pub mod fs;

pub use err::GrubErr;
pub use fs::{DirhookFlags, DirhookInfo};

/// Log2 of the sector size drivers address the disk in.
pub const DISK_SECTOR_BITS: u32 = 9;

/// Size in bytes of a driver sector. This is fixed and independent of the
/// block size of the underlying media.
pub const DISK_SECTOR_SIZE: u64 = 1 << DISK_SECTOR_BITS;

/// Sector index on a disk, in units of [`DISK_SECTOR_SIZE`].
pub type DiskAddr = u64;
