//! Page and frame number types for the paging simulator.
//!
//! This module provides newtypes for physical frame numbers and virtual page numbers.
//! Frames are opaque identifiers: nothing in this crate ever reads or writes frame contents.

use core::fmt;

use crate::geometry::{self, MAX_PAGES};

/// Macro to define common page/frame number functionality.
///
/// This macro generates the basic structure and methods common to both frame
/// and page number types, reducing code duplication.
macro_rules! impl_page_number_common {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        #[repr(transparent)]
        pub struct $name(usize);

        impl $name {
            /// Creates a new page/frame number.
            #[inline]
            pub const fn new(number: usize) -> Self {
                Self(number)
            }

            /// Returns the raw page/frame number.
            #[inline]
            pub const fn as_usize(self) -> usize {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<usize> for $name {
            #[inline]
            fn from(number: usize) -> Self {
                Self(number)
            }
        }
    };
}

impl_page_number_common!(
    FrameNumber,
    "A physical frame number (PFN).\n\n\
     Frame numbers are handed out by a [`FrameAllocator`](crate::FrameAllocator) and may be\n\
     referenced by more than one process after a copy-on-write fork."
);

impl_page_number_common!(
    PageNumber,
    "A virtual page number (VPN).\n\n\
     The high-order bits select an outer directory slot and the low-order 4 bits select\n\
     an entry within the inner page table."
);

impl PageNumber {
    /// Builds a page number from an outer index and an inner offset.
    #[inline]
    pub const fn from_parts(outer: usize, inner: usize) -> Self {
        Self((outer << geometry::INNER_BITS) | geometry::inner_offset(inner))
    }

    /// Returns the index of the outer directory slot for this page.
    #[inline]
    pub const fn outer_index(self) -> usize {
        geometry::outer_index(self.0)
    }

    /// Returns the offset of this page's entry within its inner page table.
    #[inline]
    pub const fn inner_offset(self) -> usize {
        geometry::inner_offset(self.0)
    }

    /// Returns whether this page can be described by a page directory.
    #[inline]
    pub const fn in_range(self) -> bool {
        self.0 < MAX_PAGES
    }
}
