#![cfg_attr(not(test), no_std)]

//! # Virtual Memory Manager (VMM)
//!
//! A simulated two-level paging unit for a teaching kernel. It provides:
//!
//! - Read-only translation of page numbers to frame numbers for reads and writes.
//! - Demand paging: faults install missing page tables and back pages with fresh frames.
//! - Copy-on-write fork and FIFO round-robin switching between simulated processes.
//!
//! Frames are opaque numbers handed out by a [`FrameAllocator`]; no memory contents are
//! ever stored or copied.

extern crate alloc;

mod entry;
mod flags;
mod frame_allocator;
mod geometry;
mod numbers;
mod page_directory;
mod process;
mod ready_queue;
mod scheduler;
mod table;

pub use entry::PageEntry;
pub use flags::PageFlags;
pub use frame_allocator::{AllocError, FrameAllocator, FramePool};
pub use geometry::{ENTRY_COUNT, INNER_BITS, MAX_PAGES, OUTER_SLOTS};
pub use numbers::{FrameNumber, PageNumber};
pub use page_directory::{AccessKind, PageDirectory, TranslationFault};
pub use process::{Pid, Process};
pub use ready_queue::ReadyQueue;
pub use scheduler::{AdmitError, FaultError, Scheduler, SwitchOutcome};
pub use table::PageTable;
