//! Inner page table structure.

use crate::geometry::ENTRY_COUNT;

use super::entry::PageEntry;

/// An inner page table: the second level of the walk.
///
/// Each table holds 16 entries indexed by the inner offset of a page number and is owned
/// by exactly one outer slot of one [`PageDirectory`](crate::PageDirectory). Tables are
/// never shared between processes; only the frame numbers inside their entries are.
#[derive(Clone, PartialEq, Eq)]
pub struct PageTable {
    /// The entries in this page table.
    entries: [PageEntry; ENTRY_COUNT],
}

impl PageTable {
    /// Creates a new, empty page table.
    ///
    /// All entries are initialized to zero (not valid).
    pub const fn new() -> Self {
        Self {
            entries: [PageEntry::empty(); ENTRY_COUNT],
        }
    }

    /// Returns a copy of the entry at the given index.
    ///
    /// # Panics
    /// Panics if index >= 16.
    pub fn entry(&self, index: usize) -> PageEntry {
        assert!(index < ENTRY_COUNT, "page table index out of bounds");
        self.entries[index]
    }

    /// Returns a mutable reference to the entry at the given index.
    ///
    /// # Panics
    /// Panics if index >= 16.
    pub fn entry_mut(&mut self, index: usize) -> &mut PageEntry {
        assert!(index < ENTRY_COUNT, "page table index out of bounds");
        &mut self.entries[index]
    }

    /// Iterates over `(offset, entry)` pairs in offset order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, PageEntry)> + '_ {
        self.entries.iter().copied().enumerate()
    }

    /// Splits off a copy-on-write child of this table.
    ///
    /// Every writable entry is write-protected in place, then all entries are copied into
    /// the child, so both tables end up with identical values. Returns the child and the
    /// number of entries that were demoted.
    pub fn fork_cow(&mut self) -> (PageTable, usize) {
        let mut child = PageTable::new();
        let mut demoted = 0;

        for (parent_entry, child_entry) in self.entries.iter_mut().zip(child.entries.iter_mut()) {
            if parent_entry.write_protect() {
                demoted += 1;
            }
            *child_entry = *parent_entry;
        }

        (child, demoted)
    }
}

impl Default for PageTable {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for PageTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map()
            .entries(self.iter().filter(|(_, entry)| entry.is_valid()))
            .finish()
    }
}
