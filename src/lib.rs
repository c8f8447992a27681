pub mod config;
pub mod constants;
pub mod disk;
pub mod error;
pub mod io;
pub mod memory;
pub mod paging;
pub mod process;
pub mod scheduler;
pub mod security;
pub mod simulation;

// Re-export commonly used items for convenience
pub use error::{Result, SimError};
pub use simulation::OsSimulation;
