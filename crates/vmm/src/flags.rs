//! Page table entry flags.

/// Permission flags of a page table entry.
///
/// Flags are stored as a raw usize with specific bits representing different permissions.
/// An entry with the valid bit clear maps nothing, whatever its other bits say.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageFlags(usize);

impl PageFlags {
    /// Valid bit (bit 0).
    const VALID: usize = 1 << 0;

    /// Writable bit (bit 1).
    const WRITABLE: usize = 1 << 1;

    /// All defined flag bits.
    const MASK: usize = Self::VALID | Self::WRITABLE;

    /// Creates empty page flags (page not valid).
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Creates flags for a valid, writable mapping.
    pub const fn valid_writable() -> Self {
        Self(Self::VALID | Self::WRITABLE)
    }

    /// Creates flags for a valid, read-only mapping.
    pub const fn valid_read_only() -> Self {
        Self(Self::VALID)
    }

    /// Creates page flags from a raw usize value, dropping undefined bits.
    pub const fn from_raw(raw: usize) -> Self {
        Self(raw & Self::MASK)
    }

    /// Returns the raw usize value of these flags.
    pub const fn to_raw(self) -> usize {
        self.0
    }

    /// Returns whether the valid bit is set.
    pub const fn is_valid(self) -> bool {
        (self.0 & Self::VALID) != 0
    }

    /// Sets or clears the valid bit.
    pub fn set_valid(&mut self, valid: bool) {
        if valid {
            self.0 |= Self::VALID;
        } else {
            self.0 &= !Self::VALID;
        }
    }

    /// Returns whether the writable bit is set.
    pub const fn is_writable(self) -> bool {
        (self.0 & Self::WRITABLE) != 0
    }

    /// Sets or clears the writable bit.
    pub fn set_writable(&mut self, writable: bool) {
        if writable {
            self.0 |= Self::WRITABLE;
        } else {
            self.0 &= !Self::WRITABLE;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_invalid() {
        let flags = PageFlags::empty();
        assert!(!flags.is_valid());
        assert!(!flags.is_writable());
    }

    #[test]
    fn toggles_bits_independently() {
        let mut flags = PageFlags::empty();
        flags.set_valid(true);
        flags.set_writable(true);
        assert_eq!(flags, PageFlags::valid_writable());

        flags.set_writable(false);
        assert_eq!(flags, PageFlags::valid_read_only());

        flags.set_valid(false);
        assert_eq!(flags, PageFlags::empty());
    }

    #[test]
    fn from_raw_drops_undefined_bits() {
        assert_eq!(PageFlags::from_raw(0xF1), PageFlags::valid_read_only());
    }
}
