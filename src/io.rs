use std::fs;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

use crate::disk::Direction;
use crate::security::UserRole;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

/// One request from the control layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login { username: String, password: String },
    Logout,
    AddProcess { name: String, priority: u32, burst: u64 },
    ListProcesses,
    RunRoundRobin,
    Allocate { size: usize, owner: String },
    Deallocate { address: usize },
    MemoryMap,
    AddDiskRequests(Vec<i64>),
    Scan(Direction),
    ClearDisk,
    AllocatePage(i64),
    AccessPage { page: i64, write: bool },
    ShowPageTable,
    AddUser { username: String, password: String, role: UserRole },
    ListUsers,
}

impl Command {
    /// Whether only an administrator may issue this command
    pub fn requires_admin(&self) -> bool {
        !matches!(
            self,
            Command::Login { .. }
                | Command::Logout
                | Command::AddProcess { .. }
                | Command::ListProcesses
                | Command::RunRoundRobin
        )
    }
}

/// Parse every non-empty, non-comment line of a script
pub fn parse_script(content: &str) -> Result<Vec<Command>, ParseError> {
    let mut commands = Vec::new();
    for (idx, raw) in content.lines().enumerate() {
        if let Some(cmd) = parse_command(raw).map_err(|message| ParseError { line: idx + 1, message })? {
            commands.push(cmd);
        }
    }
    Ok(commands)
}

pub fn read_script<P: AsRef<Path>>(path: P) -> Result<Vec<Command>, String> {
    let content = fs::read_to_string(path.as_ref())
        .map_err(|e| format!("Failed to read script file: {}", e))?;
    parse_script(&content).map_err(|e| e.to_string())
}

/// Parse a single line. Blank lines and `#` comments yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.split('#').next().unwrap_or("");
    let tokens: Vec<&str> = line.split_whitespace().collect();

    let cmd = match tokens.as_slice() {
        [] => return Ok(None),
        ["login", username, password] => Command::Login {
            username: username.to_string(),
            password: password.to_string(),
        },
        ["logout"] => Command::Logout,

        ["proc", "add", name, priority, burst] => Command::AddProcess {
            name: name.to_string(),
            priority: number(priority, "priority")?,
            burst: number(burst, "burst time")?,
        },
        ["proc", "list"] => Command::ListProcesses,
        ["proc", "run"] => Command::RunRoundRobin,

        ["mem", "alloc", size, owner] => Command::Allocate {
            size: number(size, "memory size")?,
            owner: owner.to_string(),
        },
        ["mem", "free", address] => Command::Deallocate { address: number(address, "address")? },
        ["mem", "map"] => Command::MemoryMap,

        ["disk", "add", positions @ ..] if !positions.is_empty() => Command::AddDiskRequests(
            positions
                .iter()
                .map(|p| number(p, "disk position"))
                .collect::<Result<_, _>>()?,
        ),
        ["disk", "scan"] => Command::Scan(Direction::default()),
        ["disk", "scan", direction] => Command::Scan(direction.parse()?),
        ["disk", "clear"] => Command::ClearDisk,

        ["page", "alloc", page] => Command::AllocatePage(number(page, "page number")?),
        ["page", "access", page] => Command::AccessPage { page: number(page, "page number")?, write: false },
        ["page", "access", page, mode] => Command::AccessPage {
            page: number(page, "page number")?,
            write: match *mode {
                "read" => false,
                "write" => true,
                other => return Err(format!("Invalid access mode: {}", other)),
            },
        },
        ["page", "table"] => Command::ShowPageTable,

        ["user", "add", username, password, role] => Command::AddUser {
            username: username.to_string(),
            password: password.to_string(),
            role: role.parse()?,
        },
        ["user", "list"] => Command::ListUsers,

        _ => return Err(format!("Unknown command: {}", tokens.join(" "))),
    };
    Ok(Some(cmd))
}

fn number<T: FromStr>(token: &str, what: &str) -> Result<T, String> {
    token.parse().map_err(|_| format!("Invalid {}: {}", what, token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_and_comment_lines() {
        assert_eq!(parse_command(""), Ok(None));
        assert_eq!(parse_command("   # just a note"), Ok(None));
    }

    #[test]
    fn test_process_commands() {
        assert_eq!(
            parse_command("proc add editor 3 5"),
            Ok(Some(Command::AddProcess { name: "editor".to_string(), priority: 3, burst: 5 }))
        );
        assert_eq!(parse_command("proc run # go"), Ok(Some(Command::RunRoundRobin)));
        assert_eq!(
            parse_command("proc add noop 1 0"),
            Ok(Some(Command::AddProcess { name: "noop".to_string(), priority: 1, burst: 0 }))
        );
        assert!(parse_command("proc add editor 3 -2").is_err());
        assert!(parse_command("proc add editor high 5").is_err());
    }

    #[test]
    fn test_memory_commands() {
        assert_eq!(
            parse_command("mem alloc 200 P1"),
            Ok(Some(Command::Allocate { size: 200, owner: "P1".to_string() }))
        );
        assert_eq!(parse_command("mem free 0"), Ok(Some(Command::Deallocate { address: 0 })));
        assert_eq!(
            parse_command("mem free -1"),
            Err("Invalid address: -1".to_string())
        );
    }

    #[test]
    fn test_disk_commands() {
        assert_eq!(
            parse_command("disk add 98 183 37"),
            Ok(Some(Command::AddDiskRequests(vec![98, 183, 37])))
        );
        assert_eq!(parse_command("disk scan"), Ok(Some(Command::Scan(Direction::Up))));
        assert_eq!(parse_command("disk scan down"), Ok(Some(Command::Scan(Direction::Down))));
        assert!(parse_command("disk add").is_err());
    }

    #[test]
    fn test_page_commands() {
        assert_eq!(parse_command("page alloc 5"), Ok(Some(Command::AllocatePage(5))));
        assert_eq!(
            parse_command("page access 5 write"),
            Ok(Some(Command::AccessPage { page: 5, write: true }))
        );
        assert_eq!(
            parse_command("page access 5"),
            Ok(Some(Command::AccessPage { page: 5, write: false }))
        );
        assert!(parse_command("page access 5 execute").is_err());
        assert_eq!(parse_command("page alloc -1"), Ok(Some(Command::AllocatePage(-1))));
        assert_eq!(
            parse_command("page access -1 read"),
            Ok(Some(Command::AccessPage { page: -1, write: false }))
        );
    }

    #[test]
    fn test_user_commands() {
        assert_eq!(
            parse_command("user add bob pw guest"),
            Ok(Some(Command::AddUser {
                username: "bob".to_string(),
                password: "pw".to_string(),
                role: UserRole::Guest,
            }))
        );
        assert!(parse_command("user add bob pw root").is_err());
    }

    #[test]
    fn test_admin_gate_classification() {
        assert!(!Command::RunRoundRobin.requires_admin());
        assert!(!Command::Logout.requires_admin());
        assert!(Command::MemoryMap.requires_admin());
        assert!(Command::Scan(Direction::Up).requires_admin());
        assert!(Command::ListUsers.requires_admin());
    }

    #[test]
    fn test_parse_script_reports_line_number() {
        let script = "login admin 1234\n\nmem alloc 10 A\nbogus\n";
        let err = parse_script(script).unwrap_err();
        assert_eq!(err.line, 4);
        assert!(err.to_string().contains("Unknown command"));

        let ok = parse_script("login admin 1234\n# comment\nmem map\n").unwrap();
        assert_eq!(ok.len(), 2);
    }
}
