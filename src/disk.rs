use tracing::debug;

use crate::constants::DEFAULT_HEAD_POSITION;

/// Initial sweep direction of the disk head
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Toward higher track numbers
    #[default]
    Up,
    Down,
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" | "higher" => Ok(Direction::Up),
            "down" | "lower" => Ok(Direction::Down),
            other => Err(format!("Invalid direction: {}", other)),
        }
    }
}

/// SCAN (elevator) disk scheduler
#[derive(Debug)]
pub struct DiskScheduler {
    head: i64,
    pending: Vec<i64>,
}

impl DiskScheduler {
    pub fn new(head: i64) -> Self {
        DiskScheduler { head, pending: Vec::new() }
    }

    pub fn head(&self) -> i64 {
        self.head
    }

    /// Pending requests in submission order
    pub fn pending(&self) -> &[i64] {
        &self.pending
    }

    pub fn add_request(&mut self, position: i64) {
        self.pending.push(position);
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Compute the service order for one sweep in `direction` followed by
    /// the return sweep. Neither the head nor the pending list is changed.
    pub fn execute_scan(&self, direction: Direction) -> Vec<i64> {
        let (mut upper, mut lower): (Vec<i64>, Vec<i64>) =
            self.pending.iter().partition(|&&pos| pos >= self.head);
        upper.sort_unstable();
        lower.sort_unstable();

        let sequence: Vec<i64> = match direction {
            Direction::Up => upper.into_iter().chain(lower.into_iter().rev()).collect(),
            Direction::Down => lower.into_iter().rev().chain(upper).collect(),
        };
        debug!(head = self.head, ?direction, ?sequence, "SCAN order computed");
        sequence
    }
}

impl Default for DiskScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_HEAD_POSITION)
    }
}
