use nalgebra::Vector3;
use std::cell::UnsafeCell;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

/// Represents a 2D buffer containing color and depth information.
/// Thread-safe for parallel rendering using atomic depth and striped locking for color.
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    pub sample_count: usize,
    pub buffer_width: usize,
    pub buffer_height: usize,

    /// Color buffer wrapped in UnsafeCell to allow interior mutability.
    /// Safety is guaranteed by `locks` and depth testing.
    color_buffer: UnsafeCell<Vec<Vector3<f32>>>,

    /// Depth buffer stored as atomic bits of f32.
    depth_buffer: Vec<AtomicU32>,

    /// Striped locks to protect color writes.
    locks: Vec<Mutex<()>>,
}

// Sync is sound because every color write goes through a stripe lock.
unsafe impl Sync for FrameBuffer {}

const LOCK_STRIPES: usize = 1024;

impl FrameBuffer {
    pub fn new(width: usize, height: usize, sample_count: usize) -> Self {
        let sample_count = sample_count.max(1);
        let buffer_width = width * sample_count;
        let buffer_height = height * sample_count;
        let size = buffer_width * buffer_height;

        let inf_bits = f32::INFINITY.to_bits();
        let depth_buffer = (0..size).map(|_| AtomicU32::new(inf_bits)).collect();
        let locks = (0..LOCK_STRIPES).map(|_| Mutex::new(())).collect();

        Self {
            width,
            height,
            sample_count,
            buffer_width,
            buffer_height,
            color_buffer: UnsafeCell::new(vec![Vector3::zeros(); size]),
            depth_buffer,
            locks,
        }
    }

    /// Resets every sample to `color` and the depth buffer to `depth`.
    pub fn clear(&mut self, color: Vector3<f32>, depth: f32) {
        self.color_buffer.get_mut().fill(color);
        let bits = depth.to_bits();
        for d in &self.depth_buffer {
            d.store(bits, Ordering::Relaxed);
        }
    }

    #[inline(always)]
    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.buffer_width && y < self.buffer_height
    }

    #[inline(always)]
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.buffer_width + x
    }

    /// Thread-safe depth test and update.
    /// Returns true (and stores the new depth) if `new_depth` is closer than the stored one.
    #[inline]
    pub fn depth_test_and_update(&self, x: usize, y: usize, new_depth: f32) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let depth_atomic = &self.depth_buffer[self.index(x, y)];
        let new_bits = new_depth.to_bits();

        let mut current_bits = depth_atomic.load(Ordering::Relaxed);
        loop {
            if new_depth >= f32::from_bits(current_bits) {
                return false;
            }
            match depth_atomic.compare_exchange_weak(
                current_bits,
                new_bits,
                Ordering::Acquire,
                Ordering::Relaxed,
            ) {
                Ok(_) => return true,
                Err(updated_bits) => current_bits = updated_bits,
            }
        }
    }

    /// Thread-safe sample write.
    /// Should only be called after `depth_test_and_update` returned true.
    #[inline]
    pub fn set_pixel_safe(&self, x: usize, y: usize, color: Vector3<f32>) {
        if !self.in_bounds(x, y) {
            return;
        }
        let idx = self.index(x, y);
        let _guard = self.locks[idx % self.locks.len()]
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        // The stripe lock for `idx` is held.
        unsafe {
            let buffer = &mut *self.color_buffer.get();
            buffer[idx] = color;
        }
    }

    /// Depth of a single sample, `None` outside the buffer.
    pub fn depth_at(&self, x: usize, y: usize) -> Option<f32> {
        self.in_bounds(x, y)
            .then(|| f32::from_bits(self.depth_buffer[self.index(x, y)].load(Ordering::Relaxed)))
    }

    /// Resolved (downsampled) pixel color. Must not race with a draw call.
    pub fn get_pixel(&self, x: usize, y: usize) -> Option<Vector3<f32>> {
        if x >= self.width || y >= self.height {
            return None;
        }

        let buffer = unsafe { &*self.color_buffer.get() };

        if self.sample_count == 1 {
            return Some(buffer[self.index(x, y)]);
        }

        let mut sum_color = Vector3::zeros();
        let start_x = x * self.sample_count;
        let start_y = y * self.sample_count;

        for dy in 0..self.sample_count {
            for dx in 0..self.sample_count {
                sum_color += buffer[self.index(start_x + dx, start_y + dy)];
            }
        }

        let samples = (self.sample_count * self.sample_count) as f32;
        Some(sum_color / samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_test_keeps_closest_sample() {
        let fb = FrameBuffer::new(4, 4, 1);
        assert!(fb.depth_test_and_update(1, 1, 0.5));
        assert!(!fb.depth_test_and_update(1, 1, 0.7));
        assert!(fb.depth_test_and_update(1, 1, 0.2));
        assert_eq!(fb.depth_at(1, 1), Some(0.2));
        assert!(!fb.depth_test_and_update(9, 9, 0.1));
    }

    #[test]
    fn get_pixel_averages_supersamples() {
        let mut fb = FrameBuffer::new(2, 2, 2);
        fb.clear(Vector3::zeros(), f32::INFINITY);
        fb.set_pixel_safe(0, 0, Vector3::new(1.0, 1.0, 1.0));
        fb.set_pixel_safe(1, 1, Vector3::new(1.0, 1.0, 1.0));

        let resolved = fb.get_pixel(0, 0).unwrap();
        assert!((resolved.x - 0.5).abs() < 1e-6);
        assert_eq!(fb.get_pixel(1, 1), Some(Vector3::zeros()));
        assert_eq!(fb.get_pixel(2, 0), None);
    }
}
