use std::collections::VecDeque;

use tracing::{debug, info, warn};

use crate::constants::DEFAULT_TIME_QUANTUM;
use crate::process::{Pid, Process};

/// A process finishing at a given simulated clock value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub pid: Pid,
    pub time: u64,
}

impl std::fmt::Display for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Process {} completed at time {}", self.pid, self.time)
    }
}

/// One turn on the simulated CPU
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlice {
    pub pid: Pid,
    pub start: u64,
    pub duration: u64,
}

/// Round-Robin CPU scheduler.
///
/// The roster keeps every submitted process in insertion order for
/// reporting; the ready queue holds roster indices.
#[derive(Debug)]
pub struct Scheduler {
    processes: Vec<Process>,
    ready_queue: VecDeque<usize>,
    time_quantum: u64,
    current_time: u64,
    timeline: Vec<TimeSlice>,
}

impl Scheduler {
    /// A quantum of 0 is raised to 1 so every turn makes progress.
    pub fn new(time_quantum: u64) -> Self {
        if time_quantum == 0 {
            warn!("time quantum 0 raised to 1");
        }
        Scheduler {
            processes: Vec::new(),
            ready_queue: VecDeque::new(),
            time_quantum: time_quantum.max(1),
            current_time: 0,
            timeline: Vec::new(),
        }
    }

    pub fn add_process(&mut self, process: Process) {
        debug!(pid = process.pid, burst = process.burst_time, "process submitted");
        self.processes.push(process);
    }

    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    pub fn current_time(&self) -> u64 {
        self.current_time
    }

    pub fn time_quantum(&self) -> u64 {
        self.time_quantum
    }

    /// Every slice executed so far, oldest first
    pub fn timeline(&self) -> &[TimeSlice] {
        &self.timeline
    }

    /// Run the ready queue to exhaustion and return completions in finish order.
    pub fn execute_round_robin(&mut self) -> Vec<Completion> {
        let mut completions = Vec::new();
        self.admit_arrivals();

        while let Some(idx) = self.ready_queue.pop_front() {
            let start = self.current_time;
            let process = &mut self.processes[idx];
            process.queued = false;

            let ran = process.run_for(self.time_quantum);
            self.current_time += ran;
            self.timeline.push(TimeSlice { pid: process.pid, start, duration: ran });
            debug!(pid = process.pid, start, duration = ran, remaining = process.remaining_time, "time slice");

            if process.completed {
                info!(pid = process.pid, time = self.current_time, "process completed");
                completions.push(Completion { pid: process.pid, time: self.current_time });
            } else {
                // preempted at quantum expiry
                process.queued = true;
                self.ready_queue.push_back(idx);
            }

            self.admit_arrivals();
        }

        completions
    }

    /// Queue every process that has arrived by the current clock and is
    /// neither finished nor already waiting.
    fn admit_arrivals(&mut self) {
        let clock = self.current_time;
        let arrived: Vec<usize> = self
            .processes
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_ready_at(clock))
            .map(|(idx, _)| idx)
            .collect();

        for idx in arrived {
            self.processes[idx].queued = true;
            self.ready_queue.push_back(idx);
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_QUANTUM)
    }
}
