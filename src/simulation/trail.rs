//! Motion trails
//!
//! A trail keeps past projected positions in chronological order. Bounded
//! trails evict from the front once full, so recording stays O(1).

use std::collections::VecDeque;

use super::error::{SimError, SimResult};
use super::states::NVec3;

#[derive(Debug, Clone, PartialEq)]
pub struct Trail {
    points: VecDeque<NVec3>,
    max_length: Option<usize>, // None = keep everything
}

impl Trail {
    pub fn bounded(max_length: usize) -> SimResult<Self> {
        if max_length == 0 {
            return Err(SimError::InvalidTrailLength);
        }
        Ok(Self {
            points: VecDeque::with_capacity(max_length),
            max_length: Some(max_length),
        })
    }

    pub fn unbounded() -> Self {
        Self {
            points: VecDeque::new(),
            max_length: None,
        }
    }

    /// Append `position`, evicting the oldest point when over capacity
    pub fn record(&mut self, position: NVec3) {
        self.points.push_back(position);
        if let Some(max) = self.max_length {
            while self.points.len() > max {
                self.points.pop_front();
            }
        }
    }

    pub fn max_length(&self) -> Option<usize> {
        self.max_length
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &NVec3> + '_ {
        self.points.iter()
    }

    pub fn latest(&self) -> Option<&NVec3> {
        self.points.back()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}
