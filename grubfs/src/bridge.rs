// SPDX-License-Identifier: MIT OR Apache-2.0

//! Forwarding of host file system calls to the driver.
//!
//! A [`Bridge`] owns the one driver of an image together with its [`Env`].
//! The host mounts volumes through it, creates and destroys file objects and
//! calls one forwarder per file system verb. Every forwarder clears the
//! last-error slot before calling into the driver, so an error seen after
//! the call was raised by that call.

use crate::disk::{Device, DeviceId, Volume};
use crate::driver::{DirHook, FsDriver};
use crate::env::Env;
use crate::file::{copy_protocol, DriverFile, HostFile};
use crate::path::{self, PathError};
use crate::result::{to_uefi, GrubErrExt};
use crate::uuid::VolumeUuid;
use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use core::fmt::{self, Debug, Formatter};
use core::ops::ControlFlow;
use grubfs_raw::{DirhookInfo, GrubErr};
use log::{debug, error, info, trace, warn};
use uefi::Status;
use uefi_raw::protocol::file_system::FileProtocolV1;

/// One mounted volume: the host-side volume, the driver-side device opened
/// on it and the dispatch table new files start from.
pub struct FileSystem {
    volume: Rc<Volume>,
    device: Rc<Device>,
    root: FileProtocolV1,
}

impl FileSystem {
    /// The host-side volume.
    #[must_use]
    pub const fn volume(&self) -> &Rc<Volume> {
        &self.volume
    }

    /// The device drivers address this volume through.
    #[must_use]
    pub const fn device(&self) -> &Rc<Device> {
        &self.device
    }

    /// Dispatch table copied into every file created on this volume.
    #[must_use]
    pub const fn root_protocol(&self) -> &FileProtocolV1 {
        &self.root
    }
}

impl Debug for FileSystem {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSystem")
            .field("volume", &self.volume)
            .field("device", &self.device)
            .finish_non_exhaustive()
    }
}

/// The adapter between one filesystem driver and the host.
///
/// An image links exactly one driver type, and the bridge holds exactly one
/// value of it. All volumes mounted through the bridge are served by that
/// driver.
pub struct Bridge<D> {
    driver: D,
    env: Env,
}

impl<D: FsDriver> Bridge<D> {
    const NAMED: () = assert!(!D::NAME.is_empty(), "filesystem drivers must have a name");

    /// Registers `driver` as the filesystem driver of this adapter.
    #[must_use]
    pub fn new(driver: D) -> Self {
        let () = Self::NAMED;
        debug!("registered {} driver", D::NAME);
        Self {
            driver,
            env: Env::new(),
        }
    }

    /// The registered driver.
    #[must_use]
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// The environment shared by all driver calls.
    #[must_use]
    pub const fn env(&self) -> &Env {
        &self.env
    }

    /// Mounts `volume`, opening the device the driver will address it by.
    ///
    /// `root` is the dispatch table of the volume's root directory. Files
    /// created on the volume start with a copy of it.
    ///
    /// Fails if another live volume uses the same key or if the device
    /// cannot be allocated.
    pub fn mount(&self, volume: Volume, root: &FileProtocolV1) -> uefi::Result<FileSystem> {
        self.env.clear_errno();
        let volume = Rc::new(volume);
        to_uefi(self.env.register_volume(&volume))?;

        let device = match Device::open(&self.env, DeviceId::Volume(&volume)) {
            Ok(device) => device,
            Err(err) => {
                self.env.unregister_volume(&volume);
                return to_uefi(Err(err));
            }
        };

        debug!("{}: mounted {}", D::NAME, volume.key());
        Ok(FileSystem {
            volume,
            device: Rc::new(device),
            root: copy_protocol(root),
        })
    }

    /// Unmounts a volume, closing its device.
    ///
    /// Files still open on the volume keep their device alive, but every
    /// read through it fails from now on.
    pub fn unmount(&self, fs: FileSystem) {
        let FileSystem { volume, device, .. } = fs;
        self.env.unregister_volume(&volume);
        match Rc::try_unwrap(device) {
            Ok(device) => device.close(),
            Err(_) => warn!("{}: unmounted with files still open", volume.key()),
        }
        debug!("{}: unmounted {}", D::NAME, volume.key());
    }

    /// Creates a file on `fs`.
    ///
    /// The file gets a copy of the volume's root dispatch table and a driver
    /// half bound to the volume's device and to this driver. It has no path
    /// and is not open yet.
    pub fn create_file(&self, fs: &FileSystem) -> uefi::Result<Box<HostFile>> {
        let file = DriverFile::new(Rc::clone(&fs.device), D::NAME);
        let file = HostFile::try_new(copy_protocol(&fs.root), file).map_err(|_| {
            warn!("{}: out of memory creating file", fs.volume.key());
            Status::OUT_OF_RESOURCES
        })?;
        trace!("{}: created file", fs.volume.key());
        Ok(file)
    }

    /// Destroys a file, driver half first.
    // The box is the allocation handed out by `create_file`; taking it back
    // is what releases it.
    #[allow(clippy::boxed_local)]
    pub fn destroy_file(&self, file: Box<HostFile>) {
        let (driver_file, path) = (*file).into_parts();
        trace!("destroying file {path}");
        drop(driver_file);
        drop(path);
    }

    /// Creates and opens the file `name`, relative to `parent` if given.
    ///
    /// The file is destroyed again if the driver fails to open it.
    pub fn open_file(
        &self,
        fs: &FileSystem,
        parent: Option<&HostFile>,
        name: &str,
    ) -> uefi::Result<Box<HostFile>> {
        let base = parent.map_or("", HostFile::path);
        let path = path::join(base, name).map_err(|err| {
            debug!("{}: cannot open {name}: {err}", fs.volume.key());
            path_status(err)
        })?;

        let mut file = self.create_file(fs)?;
        if let Err(err) = file.set_path(&path) {
            self.destroy_file(file);
            return Err(path_status(err).into());
        }
        if let Err(err) = self.open(&mut file) {
            self.destroy_file(file);
            return Err(err);
        }
        Ok(file)
    }

    /// Asks the driver to open the path stored in `file`.
    ///
    /// On success the driver has set the file size.
    pub fn open(&self, file: &mut HostFile) -> uefi::Result {
        self.env.clear_errno();
        let (path, driver_file) = file.path_and_file_mut();
        let path = if path.is_empty() { "/" } else { path };
        trace!("{}: open {path}", D::NAME);
        to_uefi(self.driver.open(&self.env, driver_file, path))
    }

    /// Lets the driver release what it set up when opening `file`.
    pub fn close(&self, file: &mut HostFile) {
        self.env.clear_errno();
        self.driver.close(&self.env, file.driver_file_mut());
    }

    /// Reads from the current offset of `file` into `buf`.
    ///
    /// The request is clamped to the bytes left in the file, so reading at
    /// or past the end succeeds with 0 bytes. On success the offset advances
    /// by the number of bytes transferred, which is returned. On failure the
    /// offset stays where it was.
    pub fn read(&self, file: &mut HostFile, buf: &mut [u8]) -> uefi::Result<usize> {
        self.env.clear_errno();
        let driver_file = file.driver_file_mut();

        let remaining = driver_file.size().saturating_sub(driver_file.offset());
        let remaining = usize::try_from(remaining).unwrap_or(usize::MAX);
        let len = remaining.min(buf.len());
        let buf = &mut buf[..len];

        let read = self.driver.read(&self.env, driver_file, buf);
        let Ok(read) = usize::try_from(read) else {
            let err = match self.env.errno() {
                GrubErr::NONE => GrubErr::READ_ERROR,
                err => err,
            };
            debug!("{}: read failed: {err}", D::NAME);
            return Err(err.to_status().into());
        };

        // The driver may not report more than it was asked for.
        let read = read.min(len);
        driver_file.set_offset(driver_file.offset() + read as u64);
        Ok(read)
    }

    /// Calls `hook` for every entry of the directory `path` on the volume of
    /// `file`, until the hook breaks.
    pub fn dir(&self, file: &HostFile, path: &str, hook: &mut DirHook<'_>) -> uefi::Result {
        self.env.clear_errno();
        let device = file.driver_file().device();
        to_uefi(self.driver.dir(&self.env, device, path, hook))
    }

    /// Returns the label of the volume `file` lives on.
    ///
    /// The caller owns the returned string.
    pub fn label(&self, file: &HostFile) -> uefi::Result<Option<String>> {
        self.env.clear_errno();
        to_uefi(self.driver.label(&self.env, file.driver_file().device()))
    }

    /// Checks whether the driver recognizes the volume of `fs`.
    ///
    /// This only asks the driver to enumerate the root directory and stops
    /// at the first entry. A driver error means the volume is not ours,
    /// which is an expected outcome: it is logged at info level and the
    /// last-error slot is reset.
    #[must_use]
    pub fn probe(&self, fs: &FileSystem) -> bool {
        if fs.device.disk().volume().is_none() {
            error!("{}: probe on an unmounted device", D::NAME);
            return false;
        }

        self.env.clear_errno();
        let mut first_entry = |_: &str, _: &DirhookInfo| ControlFlow::Break(());
        let device = &fs.device;
        let result = self.driver.dir(&self.env, device, "/", &mut first_entry);

        let pending = self.env.errno().is_err();
        match result {
            Ok(()) if !pending => return true,
            // Nothing in the slot to print.
            Err(err) if !pending => info!("error: {err}: root directory not readable"),
            _ => {}
        }
        self.env.print_error();
        debug!("{}: {} is not recognized", D::NAME, fs.volume.key());
        false
    }

    /// Returns the UUID of the volume of `fs`, if the driver knows one and it
    /// fits a host string.
    #[must_use]
    pub fn uuid(&self, fs: &FileSystem) -> Option<VolumeUuid> {
        self.env.clear_errno();
        let uuid = match self.driver.uuid(&self.env, &fs.device) {
            Ok(Some(uuid)) => uuid,
            Ok(None) => return None,
            Err(err) => {
                debug!("{}: no uuid: {err}", D::NAME);
                return None;
            }
        };
        match VolumeUuid::new(&uuid) {
            Ok(uuid) => Some(uuid),
            Err(err) => {
                error!("Could not convert UUID to UTF-16: {err:?}");
                None
            }
        }
    }
}

const fn path_status(err: PathError) -> Status {
    match err {
        PathError::OutOfMemory => Status::OUT_OF_RESOURCES,
        PathError::InteriorNul(_) => Status::INVALID_PARAMETER,
    }
}

impl<D: Debug> Debug for Bridge<D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bridge")
            .field("driver", &self.driver)
            .field("env", &self.env)
            .finish()
    }
}
