use tracing::info;

use crate::config::SimConfig;
use crate::disk::DiskScheduler;
use crate::memory::MemoryManager;
use crate::paging::PageTable;
use crate::process::{Pid, Process};
use crate::scheduler::Scheduler;
use crate::security::UserDirectory;

/// The four resource engines plus the account directory.
///
/// Engines share no state; the fields are public so the control layer can
/// drive each one directly.
#[derive(Debug)]
pub struct OsSimulation {
    pub scheduler: Scheduler,
    pub memory: MemoryManager,
    pub disk: DiskScheduler,
    pub page_table: PageTable,
    pub users: UserDirectory,
    next_pid: Pid,
}

impl OsSimulation {
    pub fn new(config: &SimConfig) -> Self {
        info!(
            quantum = config.time_quantum,
            memory = config.memory_size,
            frames = config.num_frames,
            head = config.disk_head,
            "simulation initialised"
        );
        OsSimulation {
            scheduler: Scheduler::new(config.time_quantum),
            memory: MemoryManager::new(config.memory_size),
            disk: DiskScheduler::new(config.disk_head),
            page_table: PageTable::new(config.num_frames),
            users: UserDirectory::new(&config.admin_username, &config.admin_password),
            next_pid: 1,
        }
    }

    /// Create a process arriving at time 0 and hand it to the scheduler
    pub fn submit_process(&mut self, name: &str, priority: u32, burst: u64) -> Pid {
        let pid = self.next_pid;
        self.next_pid += 1;
        self.scheduler.add_process(Process::new(pid, name, priority, burst, 0));
        pid
    }
}

impl Default for OsSimulation {
    fn default() -> Self {
        Self::new(&SimConfig::default())
    }
}
