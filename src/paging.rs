use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::constants::DEFAULT_NUM_FRAMES;
use crate::error::{Result, SimError};

/// Tracks which frames are available for allocation.
///
/// Frames are handed out from the top of the pool, so a fresh list of
/// `n` frames yields `n - 1` first.
#[derive(Debug, Clone)]
pub struct FreeFrameList {
    frames: Vec<u32>,
}

impl FreeFrameList {
    pub fn new(num_frames: u32) -> Self {
        FreeFrameList { frames: (0..num_frames).collect() }
    }

    pub fn pop(&mut self) -> Option<u32> {
        self.frames.pop()
    }

    /// Return a frame to the pool
    pub fn push(&mut self, frame: u32) {
        debug_assert!(!self.frames.contains(&frame), "frame {} freed twice", frame);
        self.frames.push(frame);
    }

    pub fn contains(&self, frame: u32) -> bool {
        self.frames.contains(&frame)
    }

    #[inline]
    pub fn free_count(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTableEntry {
    pub frame: u32,
    pub valid: bool,
    pub dirty: bool,
    pub referenced: bool,
}

impl PageTableEntry {
    fn mapped(frame: u32) -> Self {
        PageTableEntry { frame, valid: true, dirty: false, referenced: false }
    }
}

/// Demand-paged page table without eviction
#[derive(Debug)]
pub struct PageTable {
    entries: HashMap<i64, PageTableEntry>,
    free_frames: FreeFrameList,
    total_frames: u32,
}

impl PageTable {
    pub fn new(num_frames: u32) -> Self {
        PageTable {
            entries: HashMap::new(),
            free_frames: FreeFrameList::new(num_frames),
            total_frames: num_frames,
        }
    }

    /// Map `page` to a fresh frame and return the frame number.
    ///
    /// Page numbers are signed and any value is accepted. Remapping gives
    /// the old frame back to the pool first, so a mapped page can always be
    /// remapped and no frame is ever lost.
    pub fn allocate_page(&mut self, page: i64) -> Result<u32> {
        if let Some(old) = self.entries.get(&page).filter(|e| e.valid).map(|e| e.frame) {
            debug!(page, frame = old, "reclaiming frame before remap");
            self.free_frames.push(old);
        }

        let Some(frame) = self.free_frames.pop() else {
            warn!(page, "no free frame for page");
            return Err(SimError::FrameExhausted { page });
        };
        self.entries.insert(page, PageTableEntry::mapped(frame));
        info!(page, frame, "page mapped");
        Ok(frame)
    }

    /// Touch `page`, marking it referenced and, on a write, dirty
    pub fn access_page(&mut self, page: i64, is_write: bool) -> Result<()> {
        match self.entries.get_mut(&page) {
            Some(entry) if entry.valid => {
                entry.referenced = true;
                if is_write {
                    entry.dirty = true;
                }
                debug!(page, frame = entry.frame, is_write, "page hit");
                Ok(())
            }
            _ => {
                warn!(page, "page fault");
                Err(SimError::PageFault { page })
            }
        }
    }

    pub fn entry(&self, page: i64) -> Option<&PageTableEntry> {
        self.entries.get(&page)
    }

    /// Mapped pages in ascending page order
    pub fn mapped_pages(&self) -> Vec<(i64, PageTableEntry)> {
        let mut pages: Vec<(i64, PageTableEntry)> = self.entries.iter().map(|(&p, &e)| (p, e)).collect();
        pages.sort_unstable_by_key(|&(p, _)| p);
        pages
    }

    pub fn free_frames(&self) -> usize {
        self.free_frames.free_count()
    }

    pub fn total_frames(&self) -> u32 {
        self.total_frames
    }
}

impl Default for PageTable {
    fn default() -> Self {
        Self::new(DEFAULT_NUM_FRAMES)
    }
}
