//! OS Resource Simulator - Main Entry Point
//!
//! Usage: ossim [OPTIONS] [SCRIPT]
//!
//! Reads one command per line from SCRIPT (or stdin when omitted), runs it
//! against the simulated CPU scheduler, memory allocator, disk scheduler and
//! page table, and prints each result to stdout.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ossim::config::SimConfig;
use ossim::constants::MAX_LOGIN_ATTEMPTS;
use ossim::io::{parse_command, read_script, Command};
use ossim::security::{User, UserRole};
use ossim::{OsSimulation, SimError};

/// Command-line configuration
#[derive(Parser, Debug)]
#[command(name = "ossim", about = "Round-Robin, first-fit, SCAN and paging simulator")]
struct Cli {
    /// Command script to run; reads stdin when omitted
    script: Option<PathBuf>,

    /// TOML file with engine sizes and the admin account
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    quantum: Option<u64>,

    #[arg(long)]
    memory_size: Option<usize>,

    #[arg(long)]
    frames: Option<u32>,

    #[arg(long)]
    head: Option<i64>,

    /// Print detailed engine activity to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "ossim=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn load_config(cli: &Cli) -> Result<SimConfig> {
    let mut config = match &cli.config {
        Some(path) => SimConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SimConfig::default(),
    };

    if let Some(q) = cli.quantum {
        config.time_quantum = q;
    }
    if let Some(size) = cli.memory_size {
        config.memory_size = size;
    }
    if let Some(frames) = cli.frames {
        config.num_frames = frames;
    }
    if let Some(head) = cli.head {
        config.disk_head = head;
    }
    config.validate()?;
    Ok(config)
}

/// Main logic separated from main() for cleaner error handling
fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let mut shell = Shell::new(OsSimulation::new(&config));
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match &cli.script {
        Some(path) => {
            let commands = read_script(path).map_err(anyhow::Error::msg)?;
            for cmd in commands {
                shell.execute(cmd, &mut out)?;
            }
        }
        None => {
            for line in io::stdin().lock().lines() {
                match parse_command(&line?) {
                    Ok(Some(cmd)) => shell.execute(cmd, &mut out)?,
                    Ok(None) => {}
                    Err(message) => writeln!(out, "{}", message)?,
                }
            }
        }
    }
    Ok(())
}

/// The control layer: owns the simulation and the logged-in user
struct Shell {
    sim: OsSimulation,
    current_user: Option<User>,
    failed_logins: u32,
}

impl Shell {
    fn new(sim: OsSimulation) -> Self {
        Shell { sim, current_user: None, failed_logins: 0 }
    }

    /// Run one command, writing its result. Engine failures are reported
    /// and never abort the session.
    fn execute<W: Write>(&mut self, cmd: Command, out: &mut W) -> io::Result<()> {
        if let Err(e) = self.authorize(&cmd) {
            warn!(error = %e, "command rejected");
            return writeln!(out, "{}", e);
        }

        match cmd {
            Command::Login { username, password } => self.login(&username, &password, out)?,
            Command::Logout => {
                self.current_user = None;
                writeln!(out, "Logged out successfully!")?;
            }

            Command::AddProcess { name, priority, burst } => {
                let pid = self.sim.submit_process(&name, priority, burst);
                writeln!(out, "Process {} created successfully!", pid)?;
            }
            Command::ListProcesses => {
                writeln!(out, "PID\tName\tPriority\tBurst Time")?;
                writeln!(out, "{}", "-".repeat(40))?;
                for p in self.sim.scheduler.processes() {
                    writeln!(out, "{}", p)?;
                }
            }
            Command::RunRoundRobin => {
                for completion in self.sim.scheduler.execute_round_robin() {
                    writeln!(out, "{}", completion)?;
                }
            }

            Command::Allocate { size, owner } => match self.sim.memory.allocate(size, &owner) {
                Ok(address) => writeln!(out, "Memory allocated at address {} for {}", address, owner)?,
                Err(e) => writeln!(out, "Memory allocation failed: {}", e)?,
            },
            Command::Deallocate { address } => match self.sim.memory.deallocate(address) {
                Ok(()) => writeln!(out, "Memory at address {} deallocated successfully!", address)?,
                Err(e) => writeln!(out, "Memory deallocation failed: {}", e)?,
            },
            Command::MemoryMap => writeln!(out, "{}", self.sim.memory.memory_map())?,

            Command::AddDiskRequests(positions) => {
                for pos in positions {
                    self.sim.disk.add_request(pos);
                }
                writeln!(out, "{} request(s) pending", self.sim.disk.pending().len())?;
            }
            Command::Scan(direction) => {
                let sequence = self.sim.disk.execute_scan(direction);
                let rendered: Vec<String> = sequence.iter().map(|p| p.to_string()).collect();
                writeln!(out, "SCAN Algorithm Sequence: {}", rendered.join(" "))?;
            }
            Command::ClearDisk => {
                self.sim.disk.clear();
                writeln!(out, "Disk queue cleared")?;
            }

            Command::AllocatePage(page) => match self.sim.page_table.allocate_page(page) {
                Ok(frame) => writeln!(out, "Page {} allocated successfully in frame {}!", page, frame)?,
                Err(e) => writeln!(out, "Page allocation failed: {}", e)?,
            },
            Command::AccessPage { page, write } => match self.sim.page_table.access_page(page, write) {
                Ok(()) => writeln!(out, "Page {} hit", page)?,
                Err(e) => writeln!(out, "{}", e)?,
            },
            Command::ShowPageTable => {
                writeln!(out, "Page\tFrame\tValid\tDirty\tReferenced")?;
                for (page, e) in self.sim.page_table.mapped_pages() {
                    writeln!(out, "{}\t{}\t{}\t{}\t{}", page, e.frame, e.valid, e.dirty, e.referenced)?;
                }
                writeln!(
                    out,
                    "Free frames: {}/{}",
                    self.sim.page_table.free_frames(),
                    self.sim.page_table.total_frames()
                )?;
            }

            Command::AddUser { username, password, role } => {
                match self.sim.users.add_user(self.current_user.as_ref(), &username, &password, role) {
                    Ok(()) => writeln!(out, "User added successfully!")?,
                    Err(e) => writeln!(out, "Failed to add user: {}", e)?,
                }
            }
            Command::ListUsers => {
                writeln!(out, "Username\tRole")?;
                writeln!(out, "{}", "-".repeat(24))?;
                for (name, role) in self.sim.users.users() {
                    writeln!(out, "{}\t\t{}", name, role)?;
                }
            }
        }
        Ok(())
    }

    /// Role check performed before any engine is touched
    fn authorize(&self, cmd: &Command) -> Result<(), SimError> {
        if matches!(cmd, Command::Login { .. }) {
            return Ok(());
        }
        match &self.current_user {
            None => Err(SimError::AccessDenied { required: UserRole::Guest }),
            Some(user) if cmd.requires_admin() && !user.is_admin() => {
                Err(SimError::AccessDenied { required: UserRole::Admin })
            }
            Some(_) => Ok(()),
        }
    }

    fn login<W: Write>(&mut self, username: &str, password: &str, out: &mut W) -> io::Result<()> {
        match self.sim.users.authenticate(username, password) {
            Ok(user) => {
                self.failed_logins = 0;
                self.current_user = Some(user);
                writeln!(out, "Login successful!")
            }
            Err(e) => {
                self.failed_logins += 1;
                if self.failed_logins >= MAX_LOGIN_ATTEMPTS {
                    self.failed_logins = 0;
                    writeln!(out, "Too many failed attempts. Please try again later.")
                } else {
                    writeln!(
                        out,
                        "{}! Attempts remaining: {}",
                        e,
                        MAX_LOGIN_ATTEMPTS - self.failed_logins
                    )
                }
            }
        }
    }
}
