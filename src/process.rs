pub type Pid = u32;

/// A simulated process as seen by the CPU scheduler.
///
/// `remaining_time` counts down from `burst_time`. `completed` is set by
/// `run_for` once it reaches zero, so even a zero-burst process waits for
/// one turn on the CPU and is reported exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    pub pid: Pid,
    pub name: String,
    pub priority: u32,
    pub burst_time: u64,
    pub arrival_time: u64,
    pub remaining_time: u64,
    pub completed: bool,
    pub queued: bool,
}

impl Process {
    pub fn new(pid: Pid, name: impl Into<String>, priority: u32, burst_time: u64, arrival_time: u64) -> Self {
        Process {
            pid,
            name: name.into(),
            priority,
            burst_time,
            arrival_time,
            remaining_time: burst_time,
            completed: false,
            queued: false,
        }
    }

    /// Whether the process may join the ready queue at `clock`
    #[inline]
    pub fn is_ready_at(&self, clock: u64) -> bool {
        self.arrival_time <= clock && !self.completed && !self.queued
    }

    /// Run for at most `quantum` units and return how long it actually ran
    pub fn run_for(&mut self, quantum: u64) -> u64 {
        let ran = quantum.min(self.remaining_time);
        self.remaining_time -= ran;
        if self.remaining_time == 0 {
            self.completed = true;
        }
        ran
    }
}

impl std::fmt::Display for Process {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t\t{}",
            self.pid, self.name, self.priority, self.burst_time
        )
    }
}
