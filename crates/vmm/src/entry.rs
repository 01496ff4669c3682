//! Page table entries.

use crate::FrameNumber;

use super::flags::PageFlags;

/// A single page table entry.
///
/// The frame number is kept whole rather than packed next to the flags, so any frame an
/// allocator hands out round-trips unchanged. The frame of an entry whose valid bit is clear
/// carries no meaning and is never reported by [`PageEntry::frame`].
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct PageEntry {
    flags: PageFlags,
    frame: FrameNumber,
}

impl PageEntry {
    /// Creates an invalid entry with every field cleared.
    pub const fn empty() -> Self {
        Self {
            flags: PageFlags::empty(),
            frame: FrameNumber::new(0),
        }
    }

    /// Creates a new page table entry bound to `frame`.
    pub const fn new(frame: FrameNumber, flags: PageFlags) -> Self {
        Self { flags, frame }
    }

    /// Returns the frame stored in this entry.
    ///
    /// Returns None if the entry is not valid.
    pub fn frame(self) -> Option<FrameNumber> {
        if self.is_valid() {
            Some(self.frame)
        } else {
            None
        }
    }

    /// Returns the flags for this entry.
    pub fn flags(self) -> PageFlags {
        self.flags
    }

    /// Sets the flags for this entry, preserving the frame.
    pub fn set_flags(&mut self, flags: PageFlags) {
        self.flags = flags;
    }

    /// Returns whether this entry is valid.
    pub fn is_valid(self) -> bool {
        self.flags.is_valid()
    }

    /// Returns whether this entry permits writes.
    pub fn is_writable(self) -> bool {
        self.flags.is_writable()
    }

    /// Clears the writable bit, keeping the entry otherwise intact.
    ///
    /// Returns whether the entry was writable before the call.
    pub fn write_protect(&mut self) -> bool {
        let was_writable = self.flags.is_writable();
        self.flags.set_writable(false);
        was_writable
    }
}

impl core::fmt::Debug for PageEntry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PageEntry")
            .field("valid", &self.is_valid())
            .field("writable", &self.is_writable())
            .field("frame", &self.frame)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_entry_is_invalid() {
        let entry = PageEntry::default();
        assert!(!entry.is_valid());
        assert!(!entry.is_writable());
        assert_eq!(entry.frame(), None);
    }

    #[test]
    fn stores_frame_and_flags() {
        let entry = PageEntry::new(FrameNumber::new(7), PageFlags::valid_writable());
        assert!(entry.is_valid());
        assert!(entry.is_writable());
        assert_eq!(entry.frame(), Some(FrameNumber::new(7)));
    }

    #[test]
    fn invalid_entry_hides_frame() {
        let entry = PageEntry::new(FrameNumber::new(7), PageFlags::empty());
        assert_eq!(entry.frame(), None);
    }

    #[test]
    fn write_protect_keeps_frame() {
        let mut entry = PageEntry::new(FrameNumber::new(12), PageFlags::valid_writable());

        assert!(entry.write_protect());
        assert!(entry.is_valid());
        assert!(!entry.is_writable());
        assert_eq!(entry.frame(), Some(FrameNumber::new(12)));

        assert!(!entry.write_protect());
    }

    #[test]
    fn set_flags_preserves_frame() {
        let mut entry = PageEntry::new(FrameNumber::new(3), PageFlags::valid_read_only());
        entry.set_flags(PageFlags::valid_writable());
        assert_eq!(entry.frame(), Some(FrameNumber::new(3)));
        assert!(entry.is_writable());
    }

    #[test]
    fn keeps_frames_beyond_low_bits() {
        let huge = FrameNumber::new(usize::MAX);
        let entry = PageEntry::new(huge, PageFlags::valid_writable());
        assert_eq!(entry.frame(), Some(huge));
        assert!(entry.is_writable());
    }

    #[test]
    fn empty_matches_default() {
        assert_eq!(PageEntry::empty(), PageEntry::default());
    }
}
