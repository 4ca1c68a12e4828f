// SPDX-License-Identifier: MIT OR Apache-2.0

//! The interface a filesystem driver implements.

use crate::disk::Device;
use crate::env::Env;
use crate::file::DriverFile;
use crate::result::GrubResult;
use alloc::string::String;
use core::ops::ControlFlow;
use grubfs_raw::DirhookInfo;

/// Directory hook, called once per entry with its name and information.
///
/// Returning [`ControlFlow::Break`] stops the enumeration.
pub type DirHook<'a> = dyn FnMut(&str, &DirhookInfo) -> ControlFlow<()> + 'a;

/// A filesystem driver understanding one on-disk format.
///
/// Drivers read the volume through [`Disk::read`] and report failures by
/// raising them with [`Env::error`], which also records them in the
/// last-error slot the adapter inspects after each call.
///
/// [`Disk::read`]: crate::disk::Disk::read
pub trait FsDriver {
    /// Short name of the on-disk format, such as `"ext2"`. Must not be empty.
    const NAME: &'static str;

    /// Opens the file at the absolute `path` on the device of `file`.
    ///
    /// On success the driver must have set the file size with
    /// [`DriverFile::set_size`]. Per-file state goes in
    /// [`DriverFile::set_data`].
    fn open(&self, env: &Env, file: &mut DriverFile, path: &str) -> GrubResult;

    /// Reads up to `buf.len()` bytes at the current offset of `file`.
    ///
    /// Returns the number of bytes transferred or a negative value on
    /// failure, with the reason in the last-error slot. The driver does not
    /// advance the offset: the adapter does that after a successful read.
    fn read(&self, env: &Env, file: &mut DriverFile, buf: &mut [u8]) -> isize;

    /// Releases whatever [`FsDriver::open`] set up for `file`.
    fn close(&self, env: &Env, file: &mut DriverFile);

    /// Calls `hook` for each entry of the directory at `path`.
    fn dir(&self, env: &Env, device: &Device, path: &str, hook: &mut DirHook<'_>) -> GrubResult;

    /// Returns the volume label, if the filesystem has one.
    fn label(&self, env: &Env, device: &Device) -> GrubResult<Option<String>>;

    /// Returns the textual volume UUID, if the filesystem has one.
    fn uuid(&self, env: &Env, device: &Device) -> GrubResult<Option<String>>;
}
