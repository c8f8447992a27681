use tracing::{debug, info, warn};

use crate::constants::{DEFAULT_MEMORY_SIZE, FREE_OWNER};
use crate::error::{Result, SimError};

/// A contiguous address range `[start, start + size)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryBlock {
    pub start: usize,
    pub size: usize,
    /// Owning process name, `None` while the block is free
    pub owner: Option<String>,
}

impl MemoryBlock {
    pub fn free(start: usize, size: usize) -> Self {
        MemoryBlock { start, size, owner: None }
    }

    #[inline]
    pub fn is_allocated(&self) -> bool {
        self.owner.is_some()
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.size
    }
}

/// First-fit memory allocator with coalescing.
///
/// Blocks are scanned in list order. A split appends its free remainder to
/// the tail of the list, so between merges the list is not address ordered;
/// `deallocate` and `memory_map` sort it again.
#[derive(Debug)]
pub struct MemoryManager {
    total_size: usize,
    blocks: Vec<MemoryBlock>,
}

impl MemoryManager {
    pub fn new(total_size: usize) -> Self {
        MemoryManager {
            total_size,
            blocks: vec![MemoryBlock::free(0, total_size)],
        }
    }

    pub fn total_size(&self) -> usize {
        self.total_size
    }

    /// Blocks in their current list order
    pub fn blocks(&self) -> &[MemoryBlock] {
        &self.blocks
    }

    /// Allocate `size` units for `owner` and return the start address
    pub fn allocate(&mut self, size: usize, owner: &str) -> Result<usize> {
        if size == 0 {
            return Err(SimError::InvalidSize);
        }

        let Some(idx) = self
            .blocks
            .iter()
            .position(|b| !b.is_allocated() && b.size >= size)
        else {
            warn!(size, owner, "memory allocation failed");
            return Err(SimError::AllocationFailed { size, owner: owner.to_string() });
        };

        let block = &mut self.blocks[idx];
        let start = block.start;
        let remainder = (block.size > size).then(|| MemoryBlock::free(start + size, block.size - size));
        block.size = size;
        block.owner = Some(owner.to_string());

        if let Some(rest) = remainder {
            debug!(start = rest.start, size = rest.size, "split free remainder");
            self.blocks.push(rest);
        }

        info!(start, size, owner, "memory allocated");
        Ok(start)
    }

    /// Release the allocated block starting at `address` and coalesce
    pub fn deallocate(&mut self, address: usize) -> Result<()> {
        let Some(block) = self
            .blocks
            .iter_mut()
            .find(|b| b.start == address && b.is_allocated())
        else {
            warn!(address, "memory deallocation failed");
            return Err(SimError::DeallocationFailed { address });
        };

        let owner = block.owner.take();
        info!(address, size = block.size, owner = owner.as_deref().unwrap_or(FREE_OWNER), "memory released");
        self.coalesce();
        Ok(())
    }

    /// Sort by address and merge every run of adjacent free blocks into one
    pub fn coalesce(&mut self) {
        self.blocks.sort_by_key(|b| b.start);

        let mut merged: Vec<MemoryBlock> = Vec::with_capacity(self.blocks.len());
        for block in self.blocks.drain(..) {
            match merged.last_mut() {
                Some(prev) if !prev.is_allocated() && !block.is_allocated() && prev.end() == block.start => {
                    debug!(start = prev.start, absorbed = block.start, "merged free blocks");
                    prev.size += block.size;
                }
                _ => merged.push(block),
            }
        }
        self.blocks = merged;
    }

    /// Sum of the sizes of allocated blocks
    pub fn allocated(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| b.is_allocated())
            .map(|b| b.size)
            .sum()
    }

    pub fn free(&self) -> usize {
        self.total_size - self.allocated()
    }

    /// Address-ordered snapshot of every block plus capacity totals
    pub fn memory_map(&mut self) -> MemoryMap {
        self.blocks.sort_by_key(|b| b.start);
        let allocated = self.allocated();
        MemoryMap {
            blocks: self.blocks.clone(),
            total: self.total_size,
            allocated,
            free: self.total_size - allocated,
        }
    }
}

impl Default for MemoryManager {
    fn default() -> Self {
        Self::new(DEFAULT_MEMORY_SIZE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryMap {
    pub blocks: Vec<MemoryBlock>,
    pub total: usize,
    pub allocated: usize,
    pub free: usize,
}

impl std::fmt::Display for MemoryMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{:<10}{:<10}{:<15}Process", "Start", "Size", "Status")?;
        writeln!(f, "{}", "-".repeat(45))?;
        for block in &self.blocks {
            let status = if block.is_allocated() { "Allocated" } else { "Free" };
            writeln!(
                f,
                "{:<10}{:<10}{:<15}{}",
                block.start,
                block.size,
                status,
                block.owner.as_deref().unwrap_or(FREE_OWNER)
            )?;
        }
        writeln!(f)?;
        writeln!(f, "Total Memory: {} MB", self.total)?;
        writeln!(f, "Allocated Memory: {} MB", self.allocated)?;
        write!(f, "Free Memory: {} MB", self.free)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Blocks cover [0, total) exactly once with no gaps or overlaps
    fn assert_partition(mm: &MemoryManager) {
        let mut blocks = mm.blocks().to_vec();
        blocks.sort_by_key(|b| b.start);
        let mut cursor = 0;
        for b in &blocks {
            assert_eq!(b.start, cursor, "gap or overlap at {}", cursor);
            cursor = b.end();
        }
        assert_eq!(cursor, mm.total_size());
    }

    fn assert_no_adjacent_free(mm: &MemoryManager) {
        let mut blocks = mm.blocks().to_vec();
        blocks.sort_by_key(|b| b.start);
        for pair in blocks.windows(2) {
            assert!(
                pair[0].is_allocated() || pair[1].is_allocated(),
                "adjacent free blocks at {} and {}",
                pair[0].start,
                pair[1].start
            );
        }
    }

    #[test]
    fn test_initial_single_free_block() {
        let mm = MemoryManager::new(1024);
        assert_eq!(mm.blocks(), &[MemoryBlock::free(0, 1024)]);
        assert_eq!(mm.allocated(), 0);
        assert_eq!(mm.free(), 1024);
    }

    #[test]
    fn test_first_fit_reuses_freed_block() {
        let mut mm = MemoryManager::new(1024);

        assert_eq!(mm.allocate(200, "P1"), Ok(0));
        assert_eq!(mm.allocate(300, "P2"), Ok(200));
        assert_eq!(mm.deallocate(0), Ok(()));
        // the freed block precedes the tail remainder
        assert_eq!(mm.allocate(200, "P3"), Ok(0));

        assert_partition(&mm);
        assert_eq!(mm.allocated(), 500);
    }

    #[test]
    fn test_exact_fit_marks_block_in_place() {
        let mut mm = MemoryManager::new(100);
        assert_eq!(mm.allocate(100, "whole"), Ok(0));
        assert_eq!(mm.blocks().len(), 1);
        assert_eq!(mm.free(), 0);
        assert_eq!(
            mm.allocate(1, "late"),
            Err(SimError::AllocationFailed { size: 1, owner: "late".to_string() })
        );
    }

    #[test]
    fn test_zero_size_rejected() {
        let mut mm = MemoryManager::new(100);
        assert_eq!(mm.allocate(0, "empty"), Err(SimError::InvalidSize));
        assert_eq!(mm.blocks().len(), 1);
    }

    #[test]
    fn test_oversized_request_fails_without_change() {
        let mut mm = MemoryManager::new(512);
        let before = mm.blocks().to_vec();
        assert!(matches!(mm.allocate(513, "big"), Err(SimError::AllocationFailed { size: 513, .. })));
        assert_eq!(mm.blocks(), before.as_slice());
    }

    #[test]
    fn test_deallocate_unknown_address() {
        let mut mm = MemoryManager::new(1024);
        mm.allocate(100, "P1").unwrap();

        assert_eq!(mm.deallocate(50), Err(SimError::DeallocationFailed { address: 50 }));
        // the free remainder at 100 is not an allocated block
        assert_eq!(mm.deallocate(100), Err(SimError::DeallocationFailed { address: 100 }));
    }

    #[test]
    fn test_double_free_fails() {
        let mut mm = MemoryManager::new(1024);
        let addr = mm.allocate(64, "P1").unwrap();
        assert!(mm.deallocate(addr).is_ok());
        assert_eq!(mm.deallocate(addr), Err(SimError::DeallocationFailed { address: addr }));
    }

    #[test]
    fn test_coalesce_merges_both_neighbours() {
        let mut mm = MemoryManager::new(1000);
        let a = mm.allocate(100, "A").unwrap();
        let b = mm.allocate(100, "B").unwrap();
        let c = mm.allocate(100, "C").unwrap();

        mm.deallocate(a).unwrap();
        mm.deallocate(c).unwrap();
        // C merged with the tail remainder
        assert_eq!(mm.blocks().len(), 3);

        mm.deallocate(b).unwrap();
        assert_eq!(mm.blocks(), &[MemoryBlock::free(0, 1000)]);
    }

    #[test]
    fn test_coalesce_is_idempotent() {
        let mut mm = MemoryManager::new(1024);
        let addrs: Vec<usize> = (0..6).map(|i| mm.allocate(50 + i * 10, "P").unwrap()).collect();
        mm.deallocate(addrs[1]).unwrap();
        mm.deallocate(addrs[4]).unwrap();

        mm.coalesce();
        let once = mm.blocks().to_vec();
        mm.coalesce();
        assert_eq!(mm.blocks(), once.as_slice());
    }

    #[test]
    fn test_partition_holds_through_mixed_sequence() {
        let mut mm = MemoryManager::new(1024);
        let mut live = Vec::new();

        for (i, size) in [120, 40, 300, 8, 77, 200, 64].into_iter().enumerate() {
            if let Ok(addr) = mm.allocate(size, &format!("P{}", i)) {
                live.push(addr);
            }
            assert_partition(&mm);
            if i % 2 == 1 {
                let addr = live.remove(0);
                mm.deallocate(addr).unwrap();
                assert_partition(&mm);
                assert_no_adjacent_free(&mm);
            }
        }

        while let Some(addr) = live.pop() {
            mm.deallocate(addr).unwrap();
            assert_partition(&mm);
            assert_no_adjacent_free(&mm);
        }
        assert_eq!(mm.blocks(), &[MemoryBlock::free(0, 1024)]);
    }

    #[test]
    fn test_scan_follows_list_order_not_address_order() {
        let mut mm = MemoryManager::new(1000);
        mm.allocate(100, "A").unwrap(); // [A@0, free@100]
        mm.allocate(100, "B").unwrap(); // [A@0, B@100, free@200]
        mm.deallocate(0).unwrap(); // sorted: [free@0, B@100, free@200]
        // free@0 comes first in the list, so a 50-unit request splits it
        // and its remainder free@50 lands at the tail
        assert_eq!(mm.allocate(50, "C"), Ok(0));
        assert_eq!(mm.blocks().last(), Some(&MemoryBlock::free(50, 50)));
        // free@200 now precedes free@50 in list order
        assert_eq!(mm.allocate(40, "D"), Ok(200));
    }

    #[test]
    fn test_memory_map_sorted_with_totals() {
        let mut mm = MemoryManager::new(1024);
        mm.allocate(200, "P1").unwrap();
        mm.allocate(300, "P2").unwrap();

        let map = mm.memory_map();
        let starts: Vec<usize> = map.blocks.iter().map(|b| b.start).collect();
        assert_eq!(starts, vec![0, 200, 500]);
        assert_eq!(map.total, 1024);
        assert_eq!(map.allocated, 500);
        assert_eq!(map.free, 524);

        let rendered = map.to_string();
        assert!(rendered.contains("P2"));
        assert!(rendered.contains("N/A"));
        assert!(rendered.contains("Free Memory: 524 MB"));
    }
}
