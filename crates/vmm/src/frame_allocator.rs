//! Physical frame allocation.
//!
//! The paging core does not decide where frames come from. It asks a [`FrameAllocator`]
//! for a fresh frame whenever a fault needs one, and treats exhaustion as fatal for that
//! fault. [`FramePool`] is the allocator used by the simulator and its tests.

use core::fmt;

use crate::FrameNumber;

/// Errors that can occur during frame allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    /// Every frame managed by the allocator has been handed out.
    OutOfFrames,
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfFrames => f.write_str("out of physical frames"),
        }
    }
}

/// A source of physical frames.
pub trait FrameAllocator {
    /// Allocates a frame that is usable immediately.
    fn allocate_frame(&mut self) -> Result<FrameNumber, AllocError>;
}

impl<A: FrameAllocator + ?Sized> FrameAllocator for &mut A {
    fn allocate_frame(&mut self) -> Result<FrameNumber, AllocError> {
        (**self).allocate_frame()
    }
}

/// A fixed-size pool of frames handed out in ascending order.
///
/// Frames are never returned to the pool: once a copy-on-write fault privatizes a page, the
/// frame it used to share stays referenced by the other process.
#[derive(Debug, Clone)]
pub struct FramePool {
    /// First frame number managed by this pool.
    base: FrameNumber,
    /// Number of frames managed by this pool.
    total_frames: usize,
    /// Number of frames handed out so far.
    next: usize,
}

impl FramePool {
    /// Creates a pool of `capacity` frames starting at frame 0.
    pub const fn new(capacity: usize) -> Self {
        Self::with_base(FrameNumber::new(0), capacity)
    }

    /// Creates a pool of `capacity` frames starting at `base`.
    pub const fn with_base(base: FrameNumber, capacity: usize) -> Self {
        Self {
            base,
            total_frames: capacity,
            next: 0,
        }
    }

    /// Returns the total number of frames managed by this pool.
    pub fn total_frames(&self) -> usize {
        self.total_frames
    }

    /// Returns the number of frames handed out.
    pub fn allocated_frames(&self) -> usize {
        self.next
    }

    /// Returns the number of frames still available.
    pub fn free_frames(&self) -> usize {
        self.total_frames - self.next
    }
}

impl FrameAllocator for FramePool {
    fn allocate_frame(&mut self) -> Result<FrameNumber, AllocError> {
        if self.next >= self.total_frames {
            log::error!("out of frames: all {} frames allocated", self.total_frames);
            return Err(AllocError::OutOfFrames);
        }

        let Some(frame) = self.base.as_usize().checked_add(self.next) else {
            log::error!(
                "out of frames: frame {} + {} overflows",
                self.base,
                self.next
            );
            return Err(AllocError::OutOfFrames);
        };

        self.next += 1;
        Ok(FrameNumber::new(frame))
    }
}
