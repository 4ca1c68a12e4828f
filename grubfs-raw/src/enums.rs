// SPDX-License-Identifier: MIT OR Apache-2.0

//! Facilities for modeling C-style enums.
//!
//! The driver interface reports errors as plain integers, and nothing stops a
//! driver from handing back a value we have never heard of. Storing such a
//! value in a Rust enum would be undefined behavior, so these enums are
//! modeled as integer newtypes carrying a set of associated constants.

/// Interface a C-style enum as an integer newtype.
///
/// ```
/// # #[macro_use] extern crate grubfs_raw;
/// newtype_enum! {
///     /// Tri-state answer.
///     pub enum Answer: i32 => {
///         NO    =  0,
///         YES   =  1,
///         MAYBE = -1,
///     }
/// }
/// # fn main() {}
/// ```
#[macro_export]
macro_rules! newtype_enum {
    (
        $(#[$type_attrs:meta])*
        $visibility:vis enum $type:ident : $base_integer:ty => $(#[$impl_attrs:meta])* {
            $(
                $(#[$variant_attrs:meta])*
                $variant:ident = $value:expr,
            )*
        }
    ) => {
        $(#[$type_attrs])*
        #[repr(transparent)]
        #[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
        $visibility struct $type(pub $base_integer);

        $(#[$impl_attrs])*
        #[allow(unused)]
        impl $type {
            $(
                $(#[$variant_attrs])*
                pub const $variant: $type = $type($value);
            )*
        }

        impl core::fmt::Debug for $type {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                match *self {
                    // Display variants by their name, like Rust enums do
                    $(
                        $type::$variant => write!(f, stringify!($variant)),
                    )*

                    // Display unknown variants in tuple struct format
                    $type(unknown) => {
                        write!(f, "{}({})", stringify!($type), unknown)
                    }
                }
            }
        }
    }
}
