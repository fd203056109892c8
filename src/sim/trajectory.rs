//! Bounded trajectory trail
//!
//! Backed by a fixed-size sample buffer allocated once; the visible range is
//! the recorded prefix.

use glam::Vec3;

use crate::consts::TRAJECTORY_CAPACITY;

#[derive(Debug, Clone)]
pub struct Trajectory {
    samples: Box<[Vec3]>,
    len: usize,
}

impl Default for Trajectory {
    fn default() -> Self {
        Self::new()
    }
}

impl Trajectory {
    pub fn new() -> Self {
        Self {
            samples: vec![Vec3::ZERO; TRAJECTORY_CAPACITY].into_boxed_slice(),
            len: 0,
        }
    }

    /// Append a sample; returns the index written, or `None` once full
    pub fn record(&mut self, point: Vec3) -> Option<usize> {
        if self.is_full() {
            return None;
        }
        let index = self.len;
        self.samples[index] = point;
        self.len += 1;
        Some(index)
    }

    /// Drop every sample (storage is kept)
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Number of recorded samples (the visible draw range)
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len >= self.samples.len()
    }

    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    /// Recorded samples, oldest first
    pub fn points(&self) -> &[Vec3] {
        &self.samples[..self.len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_clear() {
        let mut traj = Trajectory::new();
        assert!(traj.is_empty());
        assert_eq!(traj.record(Vec3::new(0.0, 60.0, 0.0)), Some(0));
        assert_eq!(traj.record(Vec3::new(0.0, 59.0, 0.0)), Some(1));
        assert_eq!(traj.points()[1].y, 59.0);
        traj.clear();
        assert_eq!(traj.len(), 0);
        assert_eq!(traj.capacity(), TRAJECTORY_CAPACITY);
    }

    #[test]
    fn test_capacity_is_never_exceeded() {
        let mut traj = Trajectory::new();
        for i in 0..(TRAJECTORY_CAPACITY + 250) {
            let written = traj.record(Vec3::new(0.0, i as f32, 0.0));
            assert_eq!(written.is_some(), i < TRAJECTORY_CAPACITY);
        }
        assert_eq!(traj.len(), TRAJECTORY_CAPACITY);
        assert!(traj.is_full());
        assert_eq!(traj.points().last().unwrap().y, (TRAJECTORY_CAPACITY - 1) as f32);
    }
}
