//! WebGPU rendering module
//!
//! Flat-shaded meshes built on the CPU each frame (or once per restage for the
//! stage), drawn with a single lit/unlit shader under exponential fog.

pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use pipeline::{PipelinePreset, RenderState};
pub use vertex::Vertex;
