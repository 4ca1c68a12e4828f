// SPDX-License-Identifier: MIT OR Apache-2.0

//! The environment a driver runs in.
//!
//! Every driver call receives an [`Env`]. It carries the state a classic
//! driver library keeps in globals: the last-error slot and the table of
//! devices that can be opened by name. Keeping it in a value makes every
//! adapter instance independent of the others.
//!
//! The environment is single-threaded. It is neither `Send` nor `Sync`, so a
//! host that wants to share an adapter between threads must wrap it in its
//! own lock.

use crate::disk::Volume;
use crate::result::GrubResult;
use alloc::collections::BTreeMap;
use alloc::rc::{Rc, Weak};
use alloc::string::String;
use core::cell::{Cell, RefCell};
use core::fmt::{self, Write};
use grubfs_raw::GrubErr;
use log::info;

/// Per-adapter driver environment.
#[derive(Debug, Default)]
pub struct Env {
    errno: Cell<GrubErr>,
    message: RefCell<String>,
    volumes: RefCell<BTreeMap<String, Weak<Volume>>>,
}

impl Env {
    /// Creates an environment with a clear error slot and no volumes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises `err` with a formatted message.
    ///
    /// The code and message replace whatever the slot held before. Returns
    /// `err` so drivers can write `return Err(env.error(...))`.
    pub fn error(&self, err: GrubErr, args: fmt::Arguments<'_>) -> GrubErr {
        self.errno.set(err);
        let mut message = self.message.borrow_mut();
        message.clear();
        // Writing into a `String` cannot fail.
        let _ = message.write_fmt(args);
        err
    }

    /// Current value of the last-error slot.
    pub fn errno(&self) -> GrubErr {
        self.errno.get()
    }

    /// Message recorded with the current error, empty if none.
    #[must_use]
    pub fn error_message(&self) -> String {
        self.message.borrow().clone()
    }

    /// Resets the last-error slot to [`GrubErr::NONE`].
    pub fn clear_errno(&self) {
        self.errno.set(GrubErr::NONE);
        self.message.borrow_mut().clear();
    }

    /// Logs the pending error, if any, then resets the slot.
    pub fn print_error(&self) {
        let err = self.errno.replace(GrubErr::NONE);
        let message = core::mem::take(&mut *self.message.borrow_mut());
        if err.is_err() {
            if message.is_empty() {
                info!("error: {err}");
            } else {
                info!("error: {err}: {message}");
            }
        }
    }

    /// Makes `volume` reachable by name for devices opened by name.
    ///
    /// Fails with [`GrubErr::BAD_DEVICE`] if a live volume already uses the
    /// same key.
    pub fn register_volume(&self, volume: &Rc<Volume>) -> GrubResult {
        let mut volumes = self.volumes.borrow_mut();
        volumes.retain(|_, v| v.strong_count() > 0);
        if volumes.contains_key(volume.key()) {
            return Err(self.error(
                GrubErr::BAD_DEVICE,
                format_args!("device `{}` is already registered", volume.key()),
            ));
        }
        volumes.insert(String::from(volume.key()), Rc::downgrade(volume));
        Ok(())
    }

    /// Removes the name entry of `volume`.
    pub fn unregister_volume(&self, volume: &Volume) {
        self.volumes.borrow_mut().remove(volume.key());
    }

    /// Looks up a live volume by name.
    #[must_use]
    pub fn lookup_volume(&self, name: &str) -> Option<Rc<Volume>> {
        self.volumes.borrow().get(name).and_then(Weak::upgrade)
    }

    /// Number of names currently registered, live or not.
    #[must_use]
    pub fn registered_volumes(&self) -> usize {
        self.volumes.borrow().len()
    }
}
