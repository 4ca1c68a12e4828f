// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversion of host paths into driver paths.
//!
//! The host separates components with `\` and opens files relative to an
//! already open directory. Drivers want one absolute path separated by `/`,
//! without `.` or `..` components and without repeated separators. `..`
//! never climbs above the root.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::{self, Display, Formatter};

/// Separator of driver paths.
pub const SEPARATOR: char = '/';

/// Errors that may happen while building a driver path.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PathError {
    /// The path contains a NUL character at the given byte index.
    InteriorNul(usize),
    /// There was no memory for the resulting path.
    OutOfMemory,
}

impl Display for PathError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::InteriorNul(index) => write!(f, "path contains a NUL at index {index}"),
            Self::OutOfMemory => write!(f, "out of memory building path"),
        }
    }
}

impl core::error::Error for PathError {}

fn is_separator(c: char) -> bool {
    c == '\\' || c == '/'
}

fn check_nul(path: &str) -> Result<(), PathError> {
    match path.find('\0') {
        Some(index) => Err(PathError::InteriorNul(index)),
        None => Ok(()),
    }
}

/// Resolves `name` relative to the driver path `base`.
///
/// A `name` starting with a separator is absolute and ignores `base`.
pub fn join(base: &str, name: &str) -> Result<String, PathError> {
    check_nul(base)?;
    check_nul(name)?;

    let relative_base = if name.starts_with(is_separator) {
        ""
    } else {
        base
    };

    let mut components: Vec<&str> = Vec::new();
    for part in relative_base
        .split(is_separator)
        .chain(name.split(is_separator))
    {
        match part {
            "" | "." => {}
            ".." => {
                components.pop();
            }
            part => components.push(part),
        }
    }

    let len = components.iter().map(|c| c.len() + 1).sum::<usize>().max(1);
    let mut path = String::new();
    path.try_reserve_exact(len)
        .map_err(|_| PathError::OutOfMemory)?;
    if components.is_empty() {
        path.push(SEPARATOR);
    }
    for component in components {
        path.push(SEPARATOR);
        path.push_str(component);
    }
    Ok(path)
}

/// Normalizes a single path, interpreted from the root.
pub fn normalize(path: &str) -> Result<String, PathError> {
    join("", path)
}
