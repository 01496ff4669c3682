//! Two-level page directory.
//!
//! This module provides the `PageDirectory` type, which owns the outer slots of a process's
//! page table and the inner [`PageTable`]s hanging off them. It performs the read-only walk
//! used for translation and the allocating walk used by the fault handler. Forking splits a
//! directory into two copy-on-write halves.

use alloc::boxed::Box;
use core::fmt;

use crate::{
    FrameNumber, PageNumber,
    entry::PageEntry,
    flags::PageFlags,
    geometry::OUTER_SLOTS,
    table::PageTable,
};

/// The kind of memory access being translated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessKind {
    Read,
    Write,
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => f.write_str("read"),
            Self::Write => f.write_str("write"),
        }
    }
}

/// Reasons a translation can fail.
///
/// Every variant means the same thing to the caller: the access needs fault handling
/// before it can succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationFault {
    /// No valid entry maps the page: the outer slot is absent or the entry is invalid.
    Unmapped,
    /// The entry is valid but read-only and the access is a write (copy-on-write).
    WriteProtected,
    /// The page number lies outside the page directory.
    OutOfRange,
}

impl fmt::Display for TranslationFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unmapped => f.write_str("page is not mapped"),
            Self::WriteProtected => f.write_str("page is write-protected"),
            Self::OutOfRange => f.write_str("page number is out of range"),
        }
    }
}

/// The outer level of a process's page table.
///
/// Each of the 16 outer slots is either absent or owns an inner [`PageTable`]. Tables are
/// created lazily by [`PageDirectory::walk_or_create`] and copied, never shared, by
/// [`PageDirectory::fork_cow`].
#[derive(Clone, PartialEq, Eq, Default)]
pub struct PageDirectory {
    slots: [Option<Box<PageTable>>; OUTER_SLOTS],
}

impl PageDirectory {
    /// Creates a new page directory with every outer slot absent.
    pub fn new() -> Self {
        Self {
            slots: Default::default(),
        }
    }

    /// Translates `page` for an access of the given kind.
    ///
    /// Reads need a valid entry and writes need a writable one. This never allocates and
    /// never modifies the directory.
    pub fn translate(
        &self,
        access: AccessKind,
        page: PageNumber,
    ) -> Result<FrameNumber, TranslationFault> {
        if !page.in_range() {
            return Err(TranslationFault::OutOfRange);
        }

        let entry = self.entry(page).ok_or(TranslationFault::Unmapped)?;
        let frame = entry.frame().ok_or(TranslationFault::Unmapped)?;

        match access {
            AccessKind::Read => Ok(frame),
            AccessKind::Write if entry.is_writable() => Ok(frame),
            AccessKind::Write => Err(TranslationFault::WriteProtected),
        }
    }

    /// Maps `page` to `frame` with the given flags, creating the inner table if needed.
    ///
    /// The valid bit is always set on the new entry.
    ///
    /// # Panics
    /// Panics if the page number is outside the directory.
    pub fn map(&mut self, page: PageNumber, frame: FrameNumber, flags: PageFlags) {
        assert!(
            page.in_range(),
            "page number must be within the page directory"
        );

        let Some(entry) = self.walk_or_create(page) else {
            return;
        };
        let mut new_flags = flags;
        new_flags.set_valid(true);
        *entry = PageEntry::new(frame, new_flags);
    }

    /// Walks the directory to find the entry for a page.
    ///
    /// Returns None if the page is out of range or its inner table is not present.
    pub fn entry(&self, page: PageNumber) -> Option<PageEntry> {
        let table = self.slots.get(page.outer_index())?.as_deref()?;
        Some(table.entry(page.inner_offset()))
    }

    /// Returns the inner table at the given outer index, if present.
    pub fn table(&self, outer: usize) -> Option<&PageTable> {
        self.slots.get(outer)?.as_deref()
    }

    /// Returns the number of outer slots that hold an inner table.
    pub fn table_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Iterates over every valid mapping in page-number order.
    pub fn mappings(&self) -> impl Iterator<Item = (PageNumber, PageEntry)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(outer, slot)| Some((outer, slot.as_deref()?)))
            .flat_map(|(outer, table)| {
                table
                    .iter()
                    .filter(|(_, entry)| entry.is_valid())
                    .map(move |(inner, entry)| (PageNumber::from_parts(outer, inner), entry))
            })
    }

    /// Splits off a copy-on-write child of this directory.
    ///
    /// The child receives its own inner table for every present slot, with entry values
    /// identical to this directory's once every writable entry has been write-protected in
    /// both. Returns the child and the number of entries that were demoted.
    pub fn fork_cow(&mut self) -> (PageDirectory, usize) {
        let mut child = PageDirectory::new();
        let mut demoted = 0;

        for (parent_slot, child_slot) in self.slots.iter_mut().zip(child.slots.iter_mut()) {
            if let Some(parent_table) = parent_slot {
                let (table, count) = parent_table.fork_cow();
                *child_slot = Some(Box::new(table));
                demoted += count;
            }
        }

        (child, demoted)
    }

    /// Walks the directory, creating the inner table if needed.
    ///
    /// Returns a mutable reference to the entry for the page, or None if the page is out
    /// of range.
    pub fn walk_or_create(&mut self, page: PageNumber) -> Option<&mut PageEntry> {
        let slot = self.slots.get_mut(page.outer_index())?;
        let table = slot.get_or_insert_with(|| Box::new(PageTable::new()));
        Some(table.entry_mut(page.inner_offset()))
    }
}

impl fmt::Debug for PageDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.slots
                    .iter()
                    .enumerate()
                    .filter_map(|(outer, slot)| Some((outer, slot.as_deref()?))),
            )
            .finish()
    }
}

/// Prints one line per valid mapping: `vpn -> pfn (rw)` or `vpn -> pfn (ro)`.
impl fmt::Display for PageDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (page, entry) in self.mappings() {
            let Some(frame) = entry.frame() else {
                continue;
            };
            let access = if entry.is_writable() { "rw" } else { "ro" };
            writeln!(f, "{} -> {} ({})", page, frame, access)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(number: usize) -> PageNumber {
        PageNumber::new(number)
    }

    fn frame(number: usize) -> FrameNumber {
        FrameNumber::new(number)
    }

    mod translate {
        use super::*;

        #[test]
        fn absent_table_is_unmapped() {
            let dir = PageDirectory::new();
            assert_eq!(
                dir.translate(AccessKind::Read, page(0x40)),
                Err(TranslationFault::Unmapped)
            );
            assert_eq!(dir.table_count(), 0);
        }

        #[test]
        fn zeroed_entry_in_present_table_is_unmapped() {
            let mut dir = PageDirectory::new();
            dir.map(page(0x10), frame(3), PageFlags::valid_writable());

            assert_eq!(
                dir.translate(AccessKind::Read, page(0x11)),
                Err(TranslationFault::Unmapped)
            );
            assert_eq!(
                dir.translate(AccessKind::Write, page(0x11)),
                Err(TranslationFault::Unmapped)
            );
        }

        #[test]
        fn reads_valid_entry() {
            let mut dir = PageDirectory::new();
            dir.map(page(5), frame(7), PageFlags::valid_read_only());
            assert_eq!(dir.translate(AccessKind::Read, page(5)), Ok(frame(7)));
        }

        #[test]
        fn writes_only_writable_entry() {
            let mut dir = PageDirectory::new();
            dir.map(page(5), frame(7), PageFlags::valid_read_only());
            dir.map(page(6), frame(8), PageFlags::valid_writable());

            assert_eq!(
                dir.translate(AccessKind::Write, page(5)),
                Err(TranslationFault::WriteProtected)
            );
            assert_eq!(dir.translate(AccessKind::Write, page(6)), Ok(frame(8)));
        }

        #[test]
        fn out_of_range_page() {
            let dir = PageDirectory::new();
            assert_eq!(
                dir.translate(AccessKind::Read, page(0x100)),
                Err(TranslationFault::OutOfRange)
            );
        }

        #[test]
        fn does_not_allocate_tables() {
            let dir = PageDirectory::new();
            let _ = dir.translate(AccessKind::Write, page(0xF3));
            assert_eq!(dir.table(0xF), None);
        }
    }

    mod walk {
        use super::*;

        #[test]
        fn creates_table_on_demand() {
            let mut dir = PageDirectory::new();
            let entry = dir.walk_or_create(page(0x23)).unwrap();
            assert!(!entry.is_valid());

            assert!(dir.table(2).is_some());
            assert_eq!(dir.table_count(), 1);
        }

        #[test]
        fn reuses_existing_table() {
            let mut dir = PageDirectory::new();
            dir.map(page(0x20), frame(1), PageFlags::valid_writable());
            dir.map(page(0x2F), frame(2), PageFlags::valid_writable());

            assert_eq!(dir.table_count(), 1);
            assert_eq!(dir.entry(page(0x20)).and_then(PageEntry::frame), Some(frame(1)));
        }

        #[test]
        fn refuses_out_of_range_page() {
            let mut dir = PageDirectory::new();
            assert!(dir.walk_or_create(page(0x100)).is_none());
            assert_eq!(dir.table_count(), 0);
        }

        #[test]
        fn map_sets_valid_bit() {
            let mut dir = PageDirectory::new();
            dir.map(page(1), frame(4), PageFlags::empty());
            let entry = dir.entry(page(1)).unwrap();
            assert!(entry.is_valid());
            assert!(!entry.is_writable());
        }
    }

    mod fork {
        use super::*;

        #[test]
        fn child_matches_parent_after_demotion() {
            let mut parent = PageDirectory::new();
            parent.map(page(0x00), frame(7), PageFlags::valid_writable());
            parent.map(page(0x31), frame(9), PageFlags::valid_read_only());
            parent.map(page(0x3F), frame(11), PageFlags::valid_writable());

            let (child, demoted) = parent.fork_cow();

            assert_eq!(demoted, 2);
            assert_eq!(child, parent);
            assert_eq!(child.table_count(), 2);
            assert!(parent.mappings().all(|(_, entry)| !entry.is_writable()));
        }

        #[test]
        fn empty_parent_gives_empty_child() {
            let mut parent = PageDirectory::new();
            let (child, demoted) = parent.fork_cow();
            assert_eq!(demoted, 0);
            assert_eq!(child.table_count(), 0);
        }

        #[test]
        fn child_tables_are_independent() {
            let mut parent = PageDirectory::new();
            parent.map(page(0x12), frame(5), PageFlags::valid_writable());

            let (mut child, _) = parent.fork_cow();
            child.map(page(0x12), frame(6), PageFlags::valid_writable());
            child.map(page(0x13), frame(7), PageFlags::valid_writable());

            assert_eq!(parent.translate(AccessKind::Read, page(0x12)), Ok(frame(5)));
            assert_eq!(
                parent.translate(AccessKind::Read, page(0x13)),
                Err(TranslationFault::Unmapped)
            );
        }
    }

    #[test]
    fn mappings_are_in_page_order() {
        let mut dir = PageDirectory::new();
        dir.map(page(0x41), frame(3), PageFlags::valid_writable());
        dir.map(page(0x02), frame(1), PageFlags::valid_writable());
        dir.map(page(0x40), frame(2), PageFlags::valid_read_only());

        let pages: Vec<_> = dir.mappings().map(|(page, _)| page.as_usize()).collect();
        assert_eq!(pages, vec![0x02, 0x40, 0x41]);
    }

    #[test]
    fn display_lists_valid_mappings() {
        let mut dir = PageDirectory::new();
        dir.map(page(0), frame(7), PageFlags::valid_writable());
        dir.map(page(17), frame(8), PageFlags::valid_read_only());

        assert_eq!(format!("{}", dir), "0 -> 7 (rw)\n17 -> 8 (ro)\n");
    }
}
