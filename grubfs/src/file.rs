// SPDX-License-Identifier: MIT OR Apache-2.0

//! Open files, as seen by the host and by the driver.
//!
//! Every open file is a [`HostFile`] owning exactly one [`DriverFile`]. The
//! host hands out a pointer to the [`FileProtocolV1`] at the start of the
//! [`HostFile`], and the driver operates on the inner [`DriverFile`].

use crate::disk::Device;
use crate::path::{self, PathError};
use alloc::boxed::Box;
use alloc::collections::TryReserveError;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt::{self, Debug, Formatter};
use uefi_raw::protocol::file_system::FileProtocolV1;

/// Driver-side state of an open file.
pub struct DriverFile {
    device: Rc<Device>,
    fs: &'static str,
    size: u64,
    offset: u64,
    data: Option<Box<dyn Any>>,
}

impl DriverFile {
    pub(crate) fn new(device: Rc<Device>, fs: &'static str) -> Self {
        Self {
            device,
            fs,
            size: 0,
            offset: 0,
            data: None,
        }
    }

    /// The device this file lives on.
    #[must_use]
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Name of the driver this file was created for.
    #[must_use]
    pub const fn fs(&self) -> &'static str {
        self.fs
    }

    /// File size in bytes.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Sets the file size. Drivers do this when opening a file.
    pub fn set_size(&mut self, size: u64) {
        self.size = size;
    }

    /// Current read position.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    pub(crate) fn set_offset(&mut self, offset: u64) {
        self.offset = offset;
    }

    /// Attaches driver-private state to the file, replacing any previous one.
    pub fn set_data<T: Any>(&mut self, data: T) {
        self.data = Some(Box::new(data));
    }

    /// Driver-private state, if it has type `T`.
    #[must_use]
    pub fn data<T: Any>(&self) -> Option<&T> {
        self.data.as_deref().and_then(|d| d.downcast_ref())
    }

    /// Mutable driver-private state, if it has type `T`.
    #[must_use]
    pub fn data_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.data.as_deref_mut().and_then(|d| d.downcast_mut())
    }

    /// Detaches and drops the driver-private state.
    pub fn clear_data(&mut self) {
        self.data = None;
    }
}

impl Debug for DriverFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverFile")
            .field("device", &self.device.disk().name())
            .field("fs", &self.fs)
            .field("size", &self.size)
            .field("offset", &self.offset)
            .field("data", &self.data.is_some())
            .finish()
    }
}

/// Host-side state of an open file.
///
/// The layout is fixed so that a pointer to the protocol, which is the first
/// field, is also a pointer to the whole file. See [`HostFile::from_protocol`].
#[repr(C)]
pub struct HostFile {
    protocol: FileProtocolV1,
    path: String,
    file: DriverFile,
}

impl HostFile {
    /// Allocates a file, or fails without allocating anything.
    pub(crate) fn try_new(
        protocol: FileProtocolV1,
        file: DriverFile,
    ) -> Result<Box<Self>, TryReserveError> {
        try_box(Self {
            protocol,
            path: String::new(),
            file,
        })
    }

    /// Recovers the file from the protocol pointer handed to the host.
    ///
    /// # Safety
    ///
    /// `protocol` must point to the protocol of a live [`HostFile`], such as
    /// one obtained from [`HostFile::protocol_ptr`].
    #[must_use]
    pub unsafe fn from_protocol<'a>(protocol: *mut FileProtocolV1) -> &'a mut Self {
        unsafe { &mut *protocol.cast::<Self>() }
    }

    /// Pointer to the protocol to install for the host.
    #[must_use]
    pub fn protocol_ptr(&mut self) -> *mut FileProtocolV1 {
        &mut self.protocol
    }

    /// The dispatch table of this file.
    #[must_use]
    pub const fn protocol(&self) -> &FileProtocolV1 {
        &self.protocol
    }

    /// Driver path of this file.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Normalizes `path` and stores it as the driver path of this file.
    pub fn set_path(&mut self, path: &str) -> Result<(), PathError> {
        self.path = path::normalize(path)?;
        Ok(())
    }

    /// The driver-side half of this file.
    #[must_use]
    pub const fn driver_file(&self) -> &DriverFile {
        &self.file
    }

    pub(crate) fn driver_file_mut(&mut self) -> &mut DriverFile {
        &mut self.file
    }

    pub(crate) fn path_and_file_mut(&mut self) -> (&str, &mut DriverFile) {
        (&self.path, &mut self.file)
    }

    /// File size as reported by the driver.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.file.size
    }

    /// Current read position.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.file.offset
    }

    /// Moves the read position without any bounds check.
    ///
    /// Reads clamp against the size, so an offset past the end only makes
    /// reads return nothing.
    pub fn set_offset(&mut self, offset: u64) {
        self.file.set_offset(offset);
    }

    /// Moves the read position with the host's seek semantics:
    /// `u64::MAX` means end of file.
    pub fn set_position(&mut self, position: u64) {
        let offset = if position == u64::MAX {
            self.file.size
        } else {
            position
        };
        self.set_offset(offset);
    }

    /// Splits the file into its driver half and its path.
    pub(crate) fn into_parts(self) -> (DriverFile, String) {
        let Self { path, file, .. } = self;
        (file, path)
    }
}

impl Debug for HostFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostFile")
            .field("path", &self.path)
            .field("file", &self.file)
            .finish_non_exhaustive()
    }
}

/// Copies a dispatch table.
pub(crate) fn copy_protocol(template: &FileProtocolV1) -> FileProtocolV1 {
    FileProtocolV1 {
        revision: template.revision,
        open: template.open,
        close: template.close,
        delete: template.delete,
        read: template.read,
        write: template.write,
        get_position: template.get_position,
        set_position: template.set_position,
        get_info: template.get_info,
        set_info: template.set_info,
        flush: template.flush,
    }
}

/// Moves `value` to the heap, reporting allocation failure instead of
/// aborting.
pub(crate) fn try_box<T>(value: T) -> Result<Box<T>, TryReserveError> {
    let mut slot = Vec::new();
    slot.try_reserve_exact(1)?;
    slot.push(value);
    let raw = Box::into_raw(slot.into_boxed_slice()).cast::<T>();
    // SAFETY: a boxed slice of exactly one `T` has the layout of `T`.
    Ok(unsafe { Box::from_raw(raw) })
}
