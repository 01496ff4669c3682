//! Simulated processes.

use crate::PageDirectory;

/// Process identifier.
pub type Pid = u32;

/// A simulated process: an identifier and the page directory it owns.
///
/// Processes never share directory structures. After a fork, the only thing two processes
/// have in common is the frame numbers stored in their entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    pid: Pid,
    directory: PageDirectory,
}

impl Process {
    /// Creates a process with an empty page directory.
    pub fn new(pid: Pid) -> Self {
        Self {
            pid,
            directory: PageDirectory::new(),
        }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn directory(&self) -> &PageDirectory {
        &self.directory
    }

    pub fn directory_mut(&mut self) -> &mut PageDirectory {
        &mut self.directory
    }

    /// Forks a child with the given pid, sharing every mapped frame copy-on-write.
    ///
    /// Returns the child and the number of entries write-protected by the fork.
    pub fn fork(&mut self, pid: Pid) -> (Process, usize) {
        let (directory, demoted) = self.directory.fork_cow();
        (Process { pid, directory }, demoted)
    }
}
