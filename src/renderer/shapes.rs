//! Shape generation for 3D primitives
//!
//! Everything is emitted as flat-shaded triangle lists (or line lists) in
//! world or local space; callers transform as needed.

use glam::{Mat4, UVec3, Vec3};
use std::f32::consts::TAU;

use super::vertex::Vertex;

/// One triangle with a face normal, wound so the normal faces `outward`
pub fn oriented_triangle(a: Vec3, b: Vec3, c: Vec3, outward: Vec3, color: [f32; 4]) -> [Vertex; 3] {
    let normal = (b - a).cross(c - a).normalize_or_zero();
    if normal.dot(outward) < 0.0 {
        let n = -normal;
        [
            Vertex::at(a, n, color),
            Vertex::at(c, n, color),
            Vertex::at(b, n, color),
        ]
    } else {
        [
            Vertex::at(a, normal, color),
            Vertex::at(b, normal, color),
            Vertex::at(c, normal, color),
        ]
    }
}

/// Quad `a b c d` (in order around the edge) as two triangles
pub fn quad(out: &mut Vec<Vertex>, corners: [Vec3; 4], outward: Vec3, color: [f32; 4]) {
    let [a, b, c, d] = corners;
    out.extend(oriented_triangle(a, b, c, outward, color));
    out.extend(oriented_triangle(a, c, d, outward, color));
}

/// Surface of a subdivided box
///
/// `point` maps a lattice index in `0..=segments` (per axis) to a position,
/// so faces sharing an edge share displaced corners.
pub fn box_lattice(segments: UVec3, point: impl Fn(UVec3) -> Vec3, color: [f32; 4]) -> Vec<Vertex> {
    let UVec3 { x: nx, y: ny, z: nz } = segments;
    let quads = 2 * (nx * ny + ny * nz + nx * nz) as usize;
    let mut out = Vec::with_capacity(quads * 6);

    // (fixed axis, fixed index, outward normal)
    let faces = [
        (0, nx, Vec3::X),
        (0, 0, Vec3::NEG_X),
        (1, ny, Vec3::Y),
        (1, 0, Vec3::NEG_Y),
        (2, nz, Vec3::Z),
        (2, 0, Vec3::NEG_Z),
    ];

    for (axis, fixed, outward) in faces {
        // The two free axes, in x-y-z order
        let (u_axis, v_axis) = match axis {
            0 => (1, 2),
            1 => (0, 2),
            _ => (0, 1),
        };
        let (nu, nv) = (segments[u_axis], segments[v_axis]);
        let index = |u: u32, v: u32| {
            let mut idx = UVec3::ZERO;
            idx[axis] = fixed;
            idx[u_axis] = u;
            idx[v_axis] = v;
            idx
        };

        for u in 0..nu {
            for v in 0..nv {
                let corners = [
                    point(index(u, v)),
                    point(index(u + 1, v)),
                    point(index(u + 1, v + 1)),
                    point(index(u, v + 1)),
                ];
                quad(&mut out, corners, outward, color);
            }
        }
    }

    out
}

/// Axis-aligned box
pub fn cuboid(center: Vec3, size: Vec3, color: [f32; 4]) -> Vec<Vertex> {
    box_lattice(
        UVec3::ONE,
        |idx| center + size * (idx.as_vec3() - Vec3::splat(0.5)),
        color,
    )
}

/// Horizontal rectangle facing up
pub fn plane_xz(center: Vec3, width: f32, depth: f32, color: [f32; 4]) -> Vec<Vertex> {
    let hx = width / 2.0;
    let hz = depth / 2.0;
    let mut out = Vec::with_capacity(6);
    quad(
        &mut out,
        [
            center + Vec3::new(-hx, 0.0, -hz),
            center + Vec3::new(hx, 0.0, -hz),
            center + Vec3::new(hx, 0.0, hz),
            center + Vec3::new(-hx, 0.0, hz),
        ],
        Vec3::Y,
        color,
    );
    out
}

/// Rectangle in the local XY plane facing +Z
pub fn plane_xy(width: f32, height: f32, color: [f32; 4]) -> Vec<Vertex> {
    let hx = width / 2.0;
    let hy = height / 2.0;
    let mut out = Vec::with_capacity(6);
    quad(
        &mut out,
        [
            Vec3::new(-hx, -hy, 0.0),
            Vec3::new(hx, -hy, 0.0),
            Vec3::new(hx, hy, 0.0),
            Vec3::new(-hx, hy, 0.0),
        ],
        Vec3::Z,
        color,
    );
    out
}

/// Cone from a base circle at `base` to an apex along `axis`
pub fn cone(
    base: Vec3,
    axis: Vec3,
    radius: f32,
    height: f32,
    segments: u32,
    color: [f32; 4],
) -> Vec<Vertex> {
    let axis = axis.normalize_or_zero();
    let apex = base + axis * height;
    let (e1, e2) = axis.any_orthonormal_pair();
    let rim = |i: u32| {
        let theta = (i % segments) as f32 / segments as f32 * TAU;
        base + (e1 * theta.cos() + e2 * theta.sin()) * radius
    };

    let mut out = Vec::with_capacity(segments as usize * 6);
    for i in 0..segments {
        let (a, b) = (rim(i), rim(i + 1));
        let side_out = ((a + b) * 0.5 - base).normalize_or_zero();
        out.extend(oriented_triangle(a, b, apex, side_out, color));
        out.extend(oriented_triangle(base, b, a, -axis, color));
    }
    out
}

/// Single segment for a line list
pub fn line(a: Vec3, b: Vec3, color: [f32; 4]) -> [Vertex; 2] {
    [Vertex::unlit(a, color), Vertex::unlit(b, color)]
}

/// Apply a rigid transform to positions and normals
pub fn transform(vertices: &mut [Vertex], m: Mat4) {
    for v in vertices {
        v.position = m.transform_point3(Vec3::from_array(v.position)).to_array();
        v.normal = m
            .transform_vector3(Vec3::from_array(v.normal))
            .normalize_or_zero()
            .to_array();
    }
}
