pub const DEFAULT_TIME_QUANTUM: u64 = 2;
pub const DEFAULT_MEMORY_SIZE: usize = 1024;
pub const DEFAULT_NUM_FRAMES: u32 = 256;
pub const DEFAULT_HEAD_POSITION: i64 = 0;

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "1234";
pub const MAX_LOGIN_ATTEMPTS: u32 = 3;

/// Owner column shown for free blocks in a memory map
pub const FREE_OWNER: &str = "N/A";
