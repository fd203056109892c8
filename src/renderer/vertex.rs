//! Vertex types for 3D rendering

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Lit vertex with position, normal and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(position: [f32; 3], normal: [f32; 3], color: [f32; 4]) -> Self {
        Self {
            position,
            normal,
            color,
        }
    }

    pub fn at(position: Vec3, normal: Vec3, color: [f32; 4]) -> Self {
        Self::new(position.to_array(), normal.to_array(), color)
    }

    /// Vertex for unlit geometry (lines); the normal is ignored
    pub fn unlit(position: Vec3, color: [f32; 4]) -> Self {
        Self::new(position.to_array(), [0.0, 1.0, 0.0], color)
    }

    pub fn pos(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Scene palette (sRGB hex)
pub mod colors {
    pub const SKY: u32 = 0x1e293b;
    pub const OCEAN: u32 = 0x0369a1;
    pub const CLIFF: u32 = 0x5d4037;
    pub const GRASS: u32 = 0x4ade80;
    pub const RULER: u32 = 0xffffff;
    pub const SHARK: u32 = 0x475569;
    pub const LAPTOP: u32 = 0xffffff;
    pub const SCREEN: u32 = 0x000000;
    pub const VELOCITY: u32 = 0x22d3ee;
    pub const ACCELERATION: u32 = 0xfacc15;
    pub const TRAJECTORY: u32 = 0xff6600;
    pub const SPLASH: u32 = 0xffffff;
    pub const SUN: u32 = 0xfffbeb;
    pub const FILL: u32 = 0x38bdf8;

    pub const OCEAN_OPACITY: f32 = 0.9;
    pub const RULER_OPACITY: f32 = 0.5;

    fn srgb_to_linear(c: f32) -> f32 {
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    }

    /// Linear RGB from an sRGB hex color
    pub fn rgb(hex: u32) -> [f32; 3] {
        let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
        [channel(16), channel(8), channel(0)]
    }

    /// Linear RGBA from an sRGB hex color
    pub fn rgba(hex: u32, alpha: f32) -> [f32; 4] {
        let [r, g, b] = rgb(hex);
        [r, g, b, alpha]
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_hex_channels() {
            let white = rgba(0xffffff, 0.5);
            assert!(white[..3].iter().all(|c| (c - 1.0).abs() < 1e-5));
            assert_eq!(white[3], 0.5);
            assert_eq!(rgb(0x000000), [0.0, 0.0, 0.0]);
            let [r, g, b] = rgb(0xff6600);
            assert!((r - 1.0).abs() < 1e-5);
            assert!(g > 0.0 && g < 0.4);
            assert_eq!(b, 0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_matches_struct() {
        assert_eq!(std::mem::size_of::<Vertex>(), 40);
        let layout = Vertex::desc();
        assert_eq!(layout.array_stride, 40);
        assert_eq!(layout.attributes[2].offset, 24);
    }
}
