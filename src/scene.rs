//! Scene assets
//!
//! CPU-side meshes for everything on screen. The stage (ocean, cliff, grass,
//! ruler) is rebuilt whenever the experiment is restaged; the rest is
//! regenerated from the experiment every frame.

use glam::{Mat4, Quat, UVec3, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::renderer::shapes;
use crate::renderer::vertex::{Vertex, colors};
use crate::sim::{Arrow, Experiment, SimState};

pub const OCEAN_SIZE: f32 = 800.0;

pub const CLIFF_WIDTH: f32 = 50.0;
pub const CLIFF_DEPTH: f32 = 80.0;
/// How far the cliff base sits below sea level
pub const CLIFF_SINK: f32 = 5.0;
const CLIFF_SEGMENTS_XZ: u32 = 10;
/// Horizontal jitter amplitude of the sea face
const CLIFF_JITTER_X: f32 = 1.5;
const CLIFF_JITTER_Z: f32 = 1.0;
/// Sinusoidal relief of the sea face
const CLIFF_RELIEF: f32 = 2.0;
const GRASS_LIFT: f32 = 0.05;

/// Ruler line offset from the drop position
pub const RULER_OFFSET_X: f32 = 2.0;
const RULER_TICK_HALF: f32 = 0.5;
pub const RULER_TICK_SPACING: f32 = 10.0;
/// Label offset from the drop position
pub const RULER_LABEL_OFFSET_X: f32 = 4.0;

const SHARK_RADIUS: f32 = 0.4;
const SHARK_LENGTH: f32 = 1.5;
const SHARK_SEGMENTS: u32 = 8;
const ARROW_SEGMENTS: u32 = 12;
pub const DROPLET_SIZE: f32 = 0.3;

/// Geometry split by how it is drawn
#[derive(Debug, Clone, Default)]
pub struct MeshSet {
    /// Lit, depth-writing triangles
    pub opaque: Vec<Vertex>,
    /// Alpha-blended triangles
    pub translucent: Vec<Vertex>,
    /// Unlit line list
    pub lines: Vec<Vertex>,
}

impl MeshSet {
    pub fn clear(&mut self) {
        self.opaque.clear();
        self.translucent.clear();
        self.lines.clear();
    }

    pub fn vertex_count(&self) -> usize {
        self.opaque.len() + self.translucent.len() + self.lines.len()
    }
}

/// A height label on the ruler
#[derive(Debug, Clone, PartialEq)]
pub struct RulerLabel {
    pub text: String,
    pub world: Vec3,
}

/// Labels every 10 m from the water up to `height`
pub fn ruler_labels(height: f32, drop_x: f32) -> Vec<RulerLabel> {
    tick_heights(height)
        .map(|h| RulerLabel {
            text: format!("{}m", h as u32),
            world: Vec3::new(drop_x + RULER_LABEL_OFFSET_X, h, 0.0),
        })
        .collect()
}

fn tick_heights(height: f32) -> impl Iterator<Item = f32> {
    let ticks = (height / RULER_TICK_SPACING).floor().max(0.0) as u32;
    (0..=ticks).map(|k| k as f32 * RULER_TICK_SPACING)
}

/// Geometry that only changes when the experiment is restaged
#[derive(Debug, Clone)]
pub struct StaticScene {
    pub revision: u64,
    pub meshes: MeshSet,
    pub labels: Vec<RulerLabel>,
}

impl StaticScene {
    pub fn is_stale(&self, lab: &Experiment) -> bool {
        self.revision != lab.stage_revision()
    }
}

/// Builds stage geometry; owns the jitter RNG for the cliff face
pub struct SceneBuilder {
    rng: Pcg32,
    laptop: Vec<Vertex>,
    shark: Vec<Vertex>,
}

impl SceneBuilder {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            laptop: laptop_mesh(),
            shark: shark_mesh(),
        }
    }

    /// Stage geometry for the experiment's current revision
    pub fn build_static(&mut self, lab: &Experiment) -> StaticScene {
        let state = &lab.state;
        let mut meshes = MeshSet::default();

        meshes.translucent.extend(shapes::plane_xz(
            Vec3::ZERO,
            OCEAN_SIZE,
            OCEAN_SIZE,
            colors::rgba(colors::OCEAN, colors::OCEAN_OPACITY),
        ));

        meshes
            .opaque
            .extend(cliff_mesh(state.y0, state.cliff_edge_x, &mut self.rng));
        meshes.opaque.extend(shapes::plane_xz(
            Vec3::new(
                -CLIFF_WIDTH / 2.0 + state.cliff_edge_x,
                state.y0 - CLIFF_SINK + GRASS_LIFT,
                0.0,
            ),
            CLIFF_WIDTH,
            CLIFF_DEPTH,
            colors::rgba(colors::GRASS, 1.0),
        ));

        ruler_lines(state, &mut meshes.lines);

        log::debug!(
            "Stage rebuilt (revision {}): {} vertices",
            lab.stage_revision(),
            meshes.vertex_count()
        );

        StaticScene {
            revision: lab.stage_revision(),
            meshes,
            labels: ruler_labels(state.y0, state.drop_x),
        }
    }

    /// Per-frame geometry: the object, sharks, arrows and splash
    pub fn build_dynamic(&self, lab: &Experiment, out: &mut MeshSet) {
        out.clear();

        let start = out.opaque.len();
        out.opaque.extend_from_slice(&self.laptop);
        shapes::transform(&mut out.opaque[start..], lab.pose.model_matrix());

        for shark in &lab.state.sharks {
            let start = out.opaque.len();
            out.opaque.extend_from_slice(&self.shark);
            let m = Mat4::from_rotation_translation(Quat::from_rotation_y(shark.heading()), shark.pos);
            shapes::transform(&mut out.opaque[start..], m);
        }

        arrow(&lab.indicators.velocity, colors::VELOCITY, out);
        arrow(&lab.indicators.acceleration, colors::ACCELERATION, out);

        if lab.splash.is_active() {
            let color = colors::rgba(colors::SPLASH, lab.splash.opacity);
            for droplet in &lab.splash.droplets {
                out.translucent
                    .extend(shapes::cuboid(droplet.pos, Vec3::splat(DROPLET_SIZE), color));
            }
        }
    }
}

/// Trail as a line strip
pub fn trajectory_vertices(points: &[Vec3]) -> impl Iterator<Item = Vertex> + '_ {
    let color = colors::rgba(colors::TRAJECTORY, 1.0);
    points.iter().map(move |&p| Vertex::unlit(p, color))
}

/// Subdivided cliff block with a weathered sea face
fn cliff_mesh(height: f32, edge_x: f32, rng: &mut Pcg32) -> Vec<Vertex> {
    let segments = UVec3::new(
        CLIFF_SEGMENTS_XZ,
        ((height / 2.0).floor() as u32).max(2),
        CLIFF_SEGMENTS_XZ,
    );
    let size = Vec3::new(CLIFF_WIDTH, height, CLIFF_DEPTH);
    let offset = Vec3::new(-CLIFF_WIDTH / 2.0 + edge_x, height / 2.0 - CLIFF_SINK, 0.0);

    // One jitter pair per sea-face lattice point, shared by adjoining faces
    let stride = segments.z + 1;
    let jitter: Vec<(f32, f32)> = (0..(segments.y + 1) * stride)
        .map(|_| {
            (
                (rng.random::<f32>() - 0.5) * CLIFF_JITTER_X,
                (rng.random::<f32>() - 0.5) * CLIFF_JITTER_Z,
            )
        })
        .collect();

    let point = |idx: UVec3| {
        let mut p = size * (idx.as_vec3() / segments.as_vec3() - Vec3::splat(0.5));
        if idx.x == segments.x {
            let (jx, jz) = jitter[(idx.y * stride + idx.z) as usize];
            let relief = (p.y * 0.5).sin() * (p.z * 0.3).cos() * CLIFF_RELIEF;
            p.x += jx + relief;
            p.z += jz;
        }
        p + offset
    };

    shapes::box_lattice(segments, point, colors::rgba(colors::CLIFF, 1.0))
}

fn ruler_lines(state: &SimState, out: &mut Vec<Vertex>) {
    let color = colors::rgba(colors::RULER, colors::RULER_OPACITY);
    let x = state.drop_x + RULER_OFFSET_X;
    out.extend(shapes::line(
        Vec3::new(x, 0.0, 0.0),
        Vec3::new(x, state.y0, 0.0),
        color,
    ));
    for h in tick_heights(state.y0) {
        out.extend(shapes::line(
            Vec3::new(x - RULER_TICK_HALF, h, 0.0),
            Vec3::new(x + RULER_TICK_HALF, h, 0.0),
            color,
        ));
    }
}

fn arrow(arrow: &Arrow, hex: u32, out: &mut MeshSet) {
    if !arrow.visible {
        return;
    }
    let color = colors::rgba(hex, 1.0);
    let shaft = (arrow.length - arrow.head_length).max(0.0);
    let neck = arrow.origin + Arrow::DIRECTION * shaft;
    out.lines.extend(shapes::line(arrow.origin, neck, color));
    out.opaque.extend(shapes::cone(
        neck,
        Arrow::DIRECTION,
        arrow.head_width / 2.0,
        arrow.head_length.min(arrow.length),
        ARROW_SEGMENTS,
        color,
    ));
}

/// Laptop in its local frame: base, hinged lid and screen
fn laptop_mesh() -> Vec<Vertex> {
    let body = colors::rgba(colors::LAPTOP, 1.0);
    let slab = Vec3::new(1.6, 0.1, 1.1);
    let hinge = std::f32::consts::PI / 2.5;

    let mut out = shapes::cuboid(Vec3::ZERO, slab, body);

    let mut lid = shapes::cuboid(Vec3::ZERO, slab, body);
    shapes::transform(
        &mut lid,
        Mat4::from_rotation_translation(Quat::from_rotation_x(hinge), Vec3::new(0.0, 0.05, -0.55)),
    );
    out.extend(lid);

    let mut screen = shapes::plane_xy(1.4, 0.9, colors::rgba(colors::SCREEN, 1.0));
    shapes::transform(
        &mut screen,
        Mat4::from_rotation_translation(
            Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2 + hinge),
            Vec3::new(0.0, 0.4, -0.75),
        ),
    );
    out.extend(screen);
    out
}

/// Fin-shaped cone pointing along +Z
fn shark_mesh() -> Vec<Vertex> {
    shapes::cone(
        Vec3::new(0.0, 0.0, -SHARK_LENGTH / 2.0),
        Vec3::Z,
        SHARK_RADIUS,
        SHARK_LENGTH,
        SHARK_SEGMENTS,
        colors::rgba(colors::SHARK, 1.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::sim::{Action, action, tick};

    fn lab() -> Experiment {
        Experiment::new(SimulationConfig::default(), 3)
    }

    #[test]
    fn test_ruler_labels_every_ten_metres() {
        let labels = ruler_labels(65.0, 0.0);
        let texts: Vec<&str> = labels.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, ["0m", "10m", "20m", "30m", "40m", "50m", "60m"]);
        assert_eq!(labels[3].world, Vec3::new(4.0, 30.0, 0.0));
        assert_eq!(ruler_labels(60.0, 0.0).len(), 7);
    }

    #[test]
    fn test_static_stage_follows_height() {
        let mut lab = lab();
        let mut builder = SceneBuilder::new(1);
        let stage = builder.build_static(&lab);
        assert!(!stage.is_stale(&lab));

        let top = stage
            .meshes
            .opaque
            .iter()
            .map(|v| v.position[1])
            .fold(f32::MIN, f32::max);
        assert!((top - (60.0 - CLIFF_SINK + GRASS_LIFT)).abs() < 1e-3);

        // Vertical line plus seven ticks
        assert_eq!(stage.meshes.lines.len(), 2 * 8);

        lab.apply_config(SimulationConfig {
            height: 30.0,
            ..SimulationConfig::default()
        });
        assert!(stage.is_stale(&lab));
        let stage = builder.build_static(&lab);
        assert_eq!(stage.labels.len(), 4);
    }

    #[test]
    fn test_sea_face_stays_near_the_edge() {
        let mut rng = Pcg32::seed_from_u64(9);
        let verts = cliff_mesh(60.0, -4.0, &mut rng);
        let max_x = verts.iter().map(|v| v.position[0]).fold(f32::MIN, f32::max);
        let limit = CLIFF_JITTER_X / 2.0 + CLIFF_RELIEF;
        assert!(max_x <= -4.0 + limit + 1e-4);
        assert!(max_x > -4.0 - limit);
        let min_y = verts.iter().map(|v| v.position[1]).fold(f32::MAX, f32::min);
        assert!((min_y + CLIFF_SINK).abs() < 1e-4);
    }

    #[test]
    fn test_idle_frame_has_no_splash_or_velocity_arrow() {
        let mut lab = lab();
        tick(&mut lab, 1.0 / 60.0);
        let builder = SceneBuilder::new(1);
        let mut dynamic = MeshSet::default();
        builder.build_dynamic(&lab, &mut dynamic);
        assert!(dynamic.translucent.is_empty());
        // Only the acceleration shaft
        assert_eq!(dynamic.lines.len(), 2);
    }

    #[test]
    fn test_splash_droplets_after_landing() {
        let mut lab = lab();
        action::apply(&mut lab, Action::Start);
        while tick(&mut lab, 0.1).landing.is_none() {}
        let builder = SceneBuilder::new(1);
        let mut dynamic = MeshSet::default();
        builder.build_dynamic(&lab, &mut dynamic);
        assert_eq!(dynamic.translucent.len(), crate::consts::SPLASH_PARTICLES * 36);
        assert!(
            dynamic
                .translucent
                .iter()
                .all(|v| (v.color[3] - crate::consts::SPLASH_OPACITY).abs() < 0.1)
        );
        // Velocity arrow stays, acceleration arrow is gone
        assert_eq!(dynamic.lines.len(), 2);
    }

    #[test]
    fn test_laptop_follows_the_object() {
        let mut lab = lab();
        action::apply(&mut lab, Action::Step);
        tick(&mut lab, 0.0);
        let builder = SceneBuilder::new(1);
        let mut dynamic = MeshSet::default();
        builder.build_dynamic(&lab, &mut dynamic);
        let laptop = &dynamic.opaque[..builder.laptop.len()];
        let centre = laptop.iter().map(Vertex::pos).sum::<Vec3>() / laptop.len() as f32;
        assert!((centre - lab.state.object_pos()).length() < 1.5);
    }

    #[test]
    fn test_trajectory_strip() {
        let pts = [Vec3::new(0.0, 60.0, 0.0), Vec3::new(0.0, 59.0, 0.0)];
        let verts: Vec<Vertex> = trajectory_vertices(&pts).collect();
        assert_eq!(verts.len(), 2);
        assert_eq!(verts[1].position, [0.0, 59.0, 0.0]);
    }
}
