//! The paging core: translation, fault handling and process switching.
//!
//! A [`Scheduler`] owns the running process, the ready queue and the frame allocator. A
//! driver asks it to [`translate`](Scheduler::translate) each access, calls
//! [`handle_fault`](Scheduler::handle_fault) when translation fails, and calls
//! [`switch_or_fork`](Scheduler::switch_or_fork) on a context switch.

use core::{fmt, mem};

use crate::{
    AccessKind, AllocError, FrameAllocator, FrameNumber, PageEntry, PageFlags, PageNumber, Pid,
    Process, ReadyQueue, TranslationFault,
};

/// Errors that can occur while resolving a page fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultError {
    /// The frame allocator has no frame left to back the page.
    OutOfFrames,
    /// The page number lies outside the page directory.
    OutOfRange,
}

impl From<AllocError> for FaultError {
    fn from(err: AllocError) -> Self {
        match err {
            AllocError::OutOfFrames => Self::OutOfFrames,
        }
    }
}

impl fmt::Display for FaultError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfFrames => f.write_str("no physical frame available"),
            Self::OutOfRange => f.write_str("page number is out of range"),
        }
    }
}

/// Errors that can occur when admitting a process to the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmitError {
    /// A running or queued process already has this pid.
    DuplicatePid(Pid),
}

impl fmt::Display for AdmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicatePid(pid) => write!(f, "pid {} is already in use", pid),
        }
    }
}

/// What [`Scheduler::switch_or_fork`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// A queued process was scheduled.
    Switched,
    /// No process had the pid, so the running process was forked.
    Forked,
    /// The pid already names the running process; nothing changed.
    AlreadyRunning,
}

/// Single-CPU round-robin scheduler with copy-on-write fork.
///
/// Exactly one process is current at any time and it is never in the ready queue.
/// Independent schedulers share nothing, so tests can run many side by side.
pub struct Scheduler<A> {
    current: Process,
    ready: ReadyQueue,
    frames: A,
}

impl<A: FrameAllocator> Scheduler<A> {
    /// Creates a scheduler running an empty process with the given pid.
    pub fn new(pid: Pid, frames: A) -> Self {
        Self::with_process(Process::new(pid), frames)
    }

    /// Creates a scheduler running `process`.
    pub fn with_process(process: Process, frames: A) -> Self {
        Self {
            current: process,
            ready: ReadyQueue::new(),
            frames,
        }
    }

    /// Returns the running process.
    pub fn current(&self) -> &Process {
        &self.current
    }

    pub fn current_mut(&mut self) -> &mut Process {
        &mut self.current
    }

    pub fn ready_queue(&self) -> &ReadyQueue {
        &self.ready
    }

    /// Admits a process created outside of fork at the tail of the ready queue.
    ///
    /// Fails without queueing anything if the pid is already running or queued.
    pub fn admit(&mut self, process: Process) -> Result<(), AdmitError> {
        let pid = process.pid();
        if self.process(pid).is_some() {
            log::warn!("refusing to admit pid {}: pid already in use", pid);
            return Err(AdmitError::DuplicatePid(pid));
        }

        self.ready.push_back(process);
        Ok(())
    }

    pub fn frames(&self) -> &A {
        &self.frames
    }

    /// Finds a process by pid, whether running or queued.
    pub fn process(&self, pid: Pid) -> Option<&Process> {
        if self.current.pid() == pid {
            Some(&self.current)
        } else {
            self.ready.find(pid)
        }
    }

    /// Translates `page` for the running process.
    ///
    /// Any error means the access must go through [`Scheduler::handle_fault`] first.
    pub fn translate(
        &self,
        access: AccessKind,
        page: PageNumber,
    ) -> Result<FrameNumber, TranslationFault> {
        let result = self.current.directory().translate(access, page);

        #[cfg(feature = "detailed-logging")]
        log::trace!(
            "pid {}: {} of page {} -> {:?}",
            self.current.pid(),
            access,
            page,
            result
        );

        result
    }

    /// Makes `page` accessible to the running process.
    ///
    /// Installs the inner table if it is missing, then binds the entry to a brand-new
    /// writable frame. This happens for every fault, including a write to a page that is
    /// still shared copy-on-write: the shared frame is simply replaced, and its contents
    /// are not carried over. Returns the new frame.
    pub fn handle_fault(
        &mut self,
        access: AccessKind,
        page: PageNumber,
    ) -> Result<FrameNumber, FaultError> {
        let pid = self.current.pid();
        let entry = self
            .current
            .directory_mut()
            .walk_or_create(page)
            .ok_or(FaultError::OutOfRange)?;
        let shared = entry.frame();

        let frame = self.frames.allocate_frame().inspect_err(|_| {
            log::error!("pid {}: no frame left for {} fault on page {}", pid, access, page)
        })?;
        *entry = PageEntry::new(frame, PageFlags::valid_writable());

        match shared {
            Some(old) => log::debug!(
                "pid {}: {} fault on page {} replaced frame {} with {}",
                pid,
                access,
                page,
                old,
                frame
            ),
            None => log::debug!(
                "pid {}: {} fault on page {} mapped frame {}",
                pid,
                access,
                page,
                frame
            ),
        }

        Ok(frame)
    }

    /// Switches to the queued process `pid`, or forks the running process as `pid`.
    ///
    /// Either way the previously running process joins the tail of the ready queue. A fork
    /// copies every entry into the child and write-protects each writable entry in both
    /// parent and child, so the next write by either side faults.
    pub fn switch_or_fork(&mut self, pid: Pid) -> SwitchOutcome {
        if self.current.pid() == pid {
            log::debug!("pid {} is already running", pid);
            return SwitchOutcome::AlreadyRunning;
        }

        if let Some(next) = self.ready.remove(pid) {
            let previous = mem::replace(&mut self.current, next);
            log::debug!("switched from pid {} to pid {}", previous.pid(), pid);
            self.ready.push_back(previous);
            return SwitchOutcome::Switched;
        }

        let (child, demoted) = self.current.fork(pid);
        let parent = mem::replace(&mut self.current, child);
        log::debug!(
            "forked pid {} from pid {}, {} entries now copy-on-write",
            pid,
            parent.pid(),
            demoted
        );
        self.ready.push_back(parent);
        SwitchOutcome::Forked
    }
}

impl<A> fmt::Debug for Scheduler<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("current", &self.current)
            .field("ready", &self.ready)
            .finish_non_exhaustive()
    }
}
