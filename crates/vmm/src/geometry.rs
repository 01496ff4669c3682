//! Geometry of the simulated two-level page table.
//!
//! The table is a scale model of a hardware walk:
//! - 2 levels (outer directory, inner table)
//! - 4-bit inner offset (16 entries per inner table)
//! - 16 outer slots, giving 256 addressable pages
//!
//! Page number layout:
//! - Bits 0-3: Inner offset
//! - Bits 4-7: Outer index

/// Number of low-order page-number bits used as the inner offset.
pub const INNER_BITS: usize = 4;

/// Number of entries in an inner page table.
pub const ENTRY_COUNT: usize = 1 << INNER_BITS;

/// Number of slots in the outer directory.
pub const OUTER_SLOTS: usize = 16;

/// Total number of pages a single directory can address.
pub const MAX_PAGES: usize = OUTER_SLOTS * ENTRY_COUNT;

/// Returns the outer directory index for a page number.
///
/// The result may be `>= OUTER_SLOTS` for page numbers outside the table.
#[inline]
pub const fn outer_index(page: usize) -> usize {
    page >> INNER_BITS
}

/// Returns the inner table offset for a page number.
#[inline]
pub const fn inner_offset(page: usize) -> usize {
    page & (ENTRY_COUNT - 1)
}
