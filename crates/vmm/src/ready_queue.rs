//! FIFO queue of processes waiting to run.

use alloc::collections::VecDeque;

use crate::{Pid, Process};

/// Processes that are not running, in the order they will be offered the CPU.
///
/// Processes only ever join at the tail, so repeatedly scheduling the head visits every
/// queued process in round-robin order.
#[derive(Debug, Default)]
pub struct ReadyQueue {
    processes: VecDeque<Process>,
}

impl ReadyQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            processes: VecDeque::new(),
        }
    }

    /// Appends a process at the tail.
    pub fn push_back(&mut self, process: Process) {
        self.processes.push_back(process);
    }

    /// Unlinks the process with the given pid, keeping the others in order.
    pub fn remove(&mut self, pid: Pid) -> Option<Process> {
        let position = self.position(pid)?;
        self.processes.remove(position)
    }

    /// Returns the queued process with the given pid.
    pub fn find(&self, pid: Pid) -> Option<&Process> {
        self.processes.iter().find(|process| process.pid() == pid)
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.position(pid).is_some()
    }

    /// Iterates from head to tail.
    pub fn iter(&self) -> impl Iterator<Item = &Process> {
        self.processes.iter()
    }

    /// Returns the pids in queue order.
    pub fn pids(&self) -> impl Iterator<Item = Pid> + '_ {
        self.processes.iter().map(Process::pid)
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    fn position(&self, pid: Pid) -> Option<usize> {
        self.processes.iter().position(|process| process.pid() == pid)
    }
}
