//! Bounded scan history for odometry.
//!
//! Two windows are kept:
//!
//! ```text
//! recent:  [s_k-C+1, ..., s_k-1, s_k]            FIFO, capacity C
//! anchor:  [zero | a_k-C+2, ..., a_k]            zero pinned, C-1 rolling
//! ```
//!
//! The recent window feeds the relative (scan-to-scan) registration. The
//! anchor window holds the first scan ever seen and the latest scans mapped
//! back into its frame; its head is the drift-correction reference.

use std::collections::VecDeque;

use crate::core::types::PointCloud2D;

/// Recent and anchor scan windows.
#[derive(Debug, Clone)]
pub struct ScanMemory {
    capacity: usize,
    recent: VecDeque<PointCloud2D>,
    zero: Option<PointCloud2D>,
    anchored: VecDeque<PointCloud2D>,
}

impl ScanMemory {
    /// Create empty memory holding at most `capacity` scans per window.
    ///
    /// A capacity of 0 is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            recent: VecDeque::with_capacity(capacity),
            zero: None,
            anchored: VecDeque::with_capacity(capacity - 1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Seed both windows with the first scan.
    ///
    /// Only the first call pins the zero scan; later calls behave like
    /// `push_recent` plus `push_anchored`.
    pub fn seed(&mut self, scan: &PointCloud2D) {
        self.push_recent(scan.clone());
        self.push_anchored(scan.clone());
    }

    /// Append to the recent window, evicting the oldest scan past capacity.
    pub fn push_recent(&mut self, scan: PointCloud2D) {
        self.recent.push_back(scan);
        while self.recent.len() > self.capacity {
            self.recent.pop_front();
        }
    }

    /// Append to the anchor window.
    ///
    /// The first scan ever pushed becomes the zero scan and is never evicted.
    pub fn push_anchored(&mut self, scan: PointCloud2D) {
        if self.zero.is_none() {
            self.zero = Some(scan);
            return;
        }
        self.anchored.push_back(scan);
        while self.anchored.len() > self.capacity - 1 {
            self.anchored.pop_front();
        }
    }

    /// Most recently accepted scan.
    pub fn latest_recent(&self) -> Option<&PointCloud2D> {
        self.recent.back()
    }

    /// The pinned zero scan.
    pub fn anchor_head(&self) -> Option<&PointCloud2D> {
        self.zero.as_ref()
    }

    /// Iterate the anchor window, zero scan first.
    pub fn anchored(&self) -> impl Iterator<Item = &PointCloud2D> {
        self.zero.iter().chain(self.anchored.iter())
    }

    /// Iterate the recent window, oldest first.
    pub fn recent(&self) -> impl Iterator<Item = &PointCloud2D> {
        self.recent.iter()
    }

    pub fn recent_len(&self) -> usize {
        self.recent.len()
    }

    pub fn anchor_len(&self) -> usize {
        self.anchored.len() + usize::from(self.zero.is_some())
    }

    /// True once a zero scan exists.
    pub fn is_initialized(&self) -> bool {
        self.zero.is_some()
    }
}
