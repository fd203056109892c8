//! Decorative splash on landing
//!
//! A fixed cloud of droplets thrown up from the landing point, integrated with
//! explicit Euler and faded out by a shared opacity. No fluid behaviour.

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::consts::*;

#[derive(Debug, Clone, Copy, Default)]
pub struct Droplet {
    pub pos: Vec3,
    pub vel: Vec3,
}

#[derive(Debug, Clone)]
pub struct Splash {
    pub droplets: Vec<Droplet>,
    /// Shared opacity; the splash is live while this is above zero
    pub opacity: f32,
}

impl Default for Splash {
    fn default() -> Self {
        Self::new()
    }
}

impl Splash {
    /// Inert splash with all droplets parked at the origin
    pub fn new() -> Self {
        Self {
            droplets: vec![Droplet::default(); SPLASH_PARTICLES],
            opacity: 0.0,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.opacity > 0.0
    }

    /// Re-initialize every droplet at `origin` and light the effect up
    pub fn trigger(&mut self, origin: Vec3, rng: &mut Pcg32) {
        self.opacity = SPLASH_OPACITY;
        for droplet in &mut self.droplets {
            droplet.pos = origin;
            droplet.vel = Vec3::new(
                (rng.random::<f32>() - 0.5) * SPLASH_SPREAD,
                rng.random::<f32>() * SPLASH_LIFT,
                (rng.random::<f32>() - 0.5) * SPLASH_SPREAD,
            );
        }
    }

    /// Integrate one frame; does nothing once faded
    pub fn update(&mut self, dt: f32) {
        if !self.is_active() {
            return;
        }
        for droplet in &mut self.droplets {
            droplet.pos += droplet.vel * dt;
            droplet.vel.y -= SPLASH_GRAVITY * dt;
            if droplet.pos.y < 0.0 {
                droplet.pos.y = 0.0;
            }
        }
        self.opacity = (self.opacity - dt * SPLASH_FADE_RATE).max(0.0);
    }

    /// Hide immediately
    pub fn clear(&mut self) {
        self.opacity = 0.0;
    }
}
