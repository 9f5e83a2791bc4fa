use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

pub const DEFAULT_SPHERE_STACKS: u32 = 12;
pub const DEFAULT_SPHERE_SLICES: u32 = 12;

/// Corners of the canonical unit cube, extents +-0.5.
#[rustfmt::skip]
const UNIT_BOX: [Vec3; 8] = [
    Vec3::new(-0.5, -0.5, -0.5), Vec3::new( 0.5, -0.5, -0.5),
    Vec3::new( 0.5,  0.5, -0.5), Vec3::new(-0.5,  0.5, -0.5),
    Vec3::new(-0.5, -0.5,  0.5), Vec3::new( 0.5, -0.5,  0.5),
    Vec3::new( 0.5,  0.5,  0.5), Vec3::new(-0.5,  0.5,  0.5),
];

/// Counter-clockwise seen from outside, two triangles per face.
#[rustfmt::skip]
const UNIT_BOX_INDICES: [u32; 36] = [
    0, 2, 1,  0, 3, 2, // -Z
    4, 5, 6,  4, 6, 7, // +Z
    0, 4, 7,  0, 7, 3, // -X
    1, 2, 6,  1, 6, 5, // +X
    0, 1, 5,  0, 5, 4, // -Y
    3, 6, 2,  3, 7, 6, // +Y
];

/// Per-vertex attributes consumed by a graphics backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub color: Vec3,
}

/// Triangle mesh with vertices already in world space.
///
/// Meshes are immutable once generated. `transform` records the pose matrix
/// that was baked into the positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub transform: Mat4,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Index triples, one per triangle.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|tri| [tri[0], tri[1], tri[2]])
    }

    /// True when the index list is whole triangles that all reference
    /// existing vertices.
    pub fn indices_in_bounds(&self) -> bool {
        let count = self.vertices.len();
        self.indices.len() % 3 == 0 && self.indices.iter().all(|&i| (i as usize) < count)
    }

    /// Axis-aligned bounds of the vertex positions, `None` when empty.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = self.vertices.first()?.position;
        Some(self.vertices.iter().fold((first, first), |(min, max), v| {
            (min.min(v.position), max.max(v.position))
        }))
    }
}

/// Build a box of `width x height x depth` centred on `position`.
///
/// Returns 8 shared corner vertices and 12 triangles. Each corner normal is
/// the renormalized sum of the face normals of every triangle touching it, so
/// corners shade smoothly rather than per face.
pub fn generate_box(
    position: Vec3,
    orientation: Quat,
    width: f32,
    height: f32,
    depth: f32,
    color: Vec3,
) -> Mesh {
    let transform = Mat4::from_scale_rotation_translation(
        Vec3::new(width, height, depth),
        orientation,
        position,
    );

    let mut vertices: Vec<Vertex> = UNIT_BOX
        .iter()
        .map(|&corner| Vertex {
            position: transform.transform_point3(corner),
            normal: Vec3::ZERO,
            color,
        })
        .collect();
    let indices = UNIT_BOX_INDICES.to_vec();

    let mut sums = [Vec3::ZERO; 8];
    for tri in indices.chunks_exact(3) {
        let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let (v0, v1, v2) = (
            vertices[i0].position,
            vertices[i1].position,
            vertices[i2].position,
        );
        let face = (v1 - v0).cross(v2 - v0).normalize();
        sums[i0] += face;
        sums[i1] += face;
        sums[i2] += face;
    }
    for (vertex, sum) in vertices.iter_mut().zip(sums) {
        vertex.normal = sum.normalize();
    }

    tracing::debug!(
        vertices = vertices.len(),
        indices = indices.len(),
        "generated box {width}x{height}x{depth}"
    );

    Mesh {
        vertices,
        indices,
        transform,
    }
}

/// Build a UV sphere of `radius` centred on `position`.
///
/// The grid is `(stacks + 1) x (slices + 1)` vertices, duplicating the poles
/// and the `theta = 0 / 2pi` seam. `stacks` and `slices` must be at least 1
/// and the grid must fit `u32` indices, see [`sphere_vertex_count`].
pub fn generate_sphere(
    position: Vec3,
    orientation: Quat,
    radius: f32,
    color: Vec3,
    stacks: u32,
    slices: u32,
) -> Mesh {
    let transform = Mat4::from_rotation_translation(orientation, position);

    let rows = stacks as usize + 1;
    let columns = slices as usize + 1;
    let mut vertices = Vec::with_capacity(rows.saturating_mul(columns));
    for i in 0..=stacks {
        let phi = i as f32 / stacks as f32 * PI;
        for j in 0..=slices {
            let theta = j as f32 / slices as f32 * TAU;
            let unit = Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
            vertices.push(Vertex {
                position: transform.transform_point3(unit * radius),
                normal: orientation * unit.normalize(),
                color,
            });
        }
    }

    let mut indices = Vec::with_capacity((stacks as usize).saturating_mul(slices as usize * 6));
    for i in 0..stacks {
        for j in 0..slices {
            let first = i * (slices + 1) + j;
            let second = first + slices + 1;
            indices.extend_from_slice(&[first, second, first + 1]);
            indices.extend_from_slice(&[second, second + 1, first + 1]);
        }
    }

    tracing::debug!(
        vertices = vertices.len(),
        indices = indices.len(),
        "generated sphere r={radius} {stacks}x{slices}"
    );

    Mesh {
        vertices,
        indices,
        transform,
    }
}

/// Vertex count of a `stacks x slices` sphere, or `None` when it exceeds the
/// `u32` index range.
pub fn sphere_vertex_count(stacks: u32, slices: u32) -> Option<u32> {
    (u64::from(stacks) + 1)
        .checked_mul(u64::from(slices) + 1)
        .and_then(|n| u32::try_from(n).ok())
}

/// A two-point line, the only geometry that may be updated after creation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub start: Vec3,
    pub end: Vec3,
    pub color: Vec3,
}

impl LineSegment {
    pub fn new(start: Vec3, end: Vec3, color: Vec3) -> Self {
        Self { start, end, color }
    }

    /// Endpoints as vertices. Lines are unlit, so normals are zero.
    pub fn vertices(&self) -> [Vertex; 2] {
        [self.start, self.end].map(|position| Vertex {
            position,
            normal: Vec3::ZERO,
            color: self.color,
        })
    }

    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const RED: Vec3 = Vec3::new(1.0, 0.0, 0.0);

    fn face_normal(mesh: &Mesh, tri: [u32; 3]) -> Vec3 {
        let p = |i: u32| mesh.vertices[i as usize].position;
        (p(tri[1]) - p(tri[0])).cross(p(tri[2]) - p(tri[0]))
    }

    #[test]
    fn unit_box_corners_at_plus_minus_one() {
        let mesh = generate_box(Vec3::ZERO, Quat::IDENTITY, 2.0, 2.0, 2.0, RED);
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.indices.len(), 36);
        assert_eq!(mesh.triangle_count(), 12);
        for v in &mesh.vertices {
            for c in v.position.to_array() {
                assert_abs_diff_eq!(c.abs(), 1.0, epsilon = 1e-6);
            }
            assert_eq!(v.color, RED);
        }
        let mut corners: Vec<[i32; 3]> = mesh
            .vertices
            .iter()
            .map(|v| v.position.round().as_ivec3().to_array())
            .collect();
        corners.sort();
        corners.dedup();
        assert_eq!(corners.len(), 8);
    }

    #[test]
    fn box_normals_are_unit_and_outward() {
        let orientation = Quat::from_euler(glam::EulerRot::YXZ, 0.4, -0.3, 1.1);
        let center = Vec3::new(3.0, -2.0, 0.5);
        let mesh = generate_box(center, orientation, 0.6, 0.9, 0.3, RED);
        for v in &mesh.vertices {
            assert_abs_diff_eq!(v.normal.length(), 1.0, epsilon = 1e-5);
            assert!(v.normal.dot(v.position - center) > 0.0);
        }
    }

    #[test]
    fn box_triangles_wind_outward() {
        let mesh = generate_box(Vec3::ZERO, Quat::IDENTITY, 1.0, 2.0, 3.0, RED);
        for tri in mesh.triangles() {
            let centroid = tri
                .iter()
                .map(|&i| mesh.vertices[i as usize].position)
                .sum::<Vec3>()
                / 3.0;
            assert!(face_normal(&mesh, tri).dot(centroid) > 0.0, "{tri:?}");
        }
    }

    #[test]
    fn box_transform_is_translate_rotate_scale() {
        let orientation = Quat::from_rotation_z(0.5);
        let mesh = generate_box(Vec3::new(1.0, 2.0, 3.0), orientation, 2.0, 4.0, 6.0, RED);
        let expected = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0))
            * Mat4::from_quat(orientation)
            * Mat4::from_scale(Vec3::new(2.0, 4.0, 6.0));
        assert!(mesh.transform.abs_diff_eq(expected, 1e-5));
        assert!(mesh.indices_in_bounds());
    }

    #[test]
    fn sphere_counts_match_grid() {
        for (stacks, slices) in [(1, 1), (4, 4), (3, 7), (16, 16)] {
            let mesh = generate_sphere(Vec3::ZERO, Quat::IDENTITY, 1.0, RED, stacks, slices);
            assert_eq!(mesh.vertex_count(), ((stacks + 1) * (slices + 1)) as usize);
            assert_eq!(mesh.indices.len(), (6 * stacks * slices) as usize);
            assert!(mesh.indices_in_bounds());
        }
    }

    #[test]
    fn sphere_vertex_count_limits() {
        assert_eq!(sphere_vertex_count(12, 12), Some(169));
        assert_eq!(
            sphere_vertex_count(3, 7).map(|n| n as usize),
            Some(generate_sphere(Vec3::ZERO, Quat::IDENTITY, 1.0, RED, 3, 7).vertex_count())
        );
        // 65536 * 65535 vertices still index with u32
        assert_eq!(sphere_vertex_count(65535, 65534), Some(u32::MAX - 65535));
        assert_eq!(sphere_vertex_count(65535, 65535), None);
        assert_eq!(sphere_vertex_count(u32::MAX, 1), None);
        assert_eq!(sphere_vertex_count(u32::MAX, u32::MAX), None);
    }

    #[test]
    fn unit_sphere_scenario() {
        let mesh = generate_sphere(Vec3::ZERO, Quat::IDENTITY, 1.0, RED, 4, 4);
        assert_eq!(mesh.vertex_count(), 25);
        assert_eq!(mesh.indices.len(), 96);
        for v in &mesh.vertices {
            assert_abs_diff_eq!(v.position.length(), 1.0, epsilon = 1e-5);
            assert_eq!(v.color, RED);
        }
    }

    #[test]
    fn sphere_vertices_at_radius_from_center() {
        let center = Vec3::new(-4.0, 2.5, 9.0);
        let orientation = Quat::from_axis_angle(Vec3::new(1.0, 1.0, 0.0).normalize(), 0.8);
        let mesh = generate_sphere(center, orientation, 0.22, RED, 16, 16);
        for v in &mesh.vertices {
            assert_abs_diff_eq!(v.position.distance(center), 0.22, epsilon = 1e-5);
            assert_abs_diff_eq!(v.normal.length(), 1.0, epsilon = 1e-5);
            let radial = (v.position - center).normalize();
            assert_abs_diff_eq!(v.normal.dot(radial), 1.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn sphere_normals_radial_with_identity_orientation() {
        let mesh = generate_sphere(Vec3::new(1.0, 1.0, 1.0), Quat::IDENTITY, 3.0, RED, 6, 8);
        for v in &mesh.vertices {
            let radial = (v.position - Vec3::ONE).normalize();
            assert_abs_diff_eq!(v.normal.dot(radial), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn sphere_index_pattern() {
        let mesh = generate_sphere(Vec3::ZERO, Quat::IDENTITY, 1.0, RED, 2, 3);
        // first quad: first = 0, second = slices + 1 = 4
        assert_eq!(&mesh.indices[..6], &[0, 4, 1, 4, 5, 1]);
        // last quad: i = 1, j = 2 -> first = 6, second = 10
        assert_eq!(&mesh.indices[mesh.indices.len() - 6..], &[6, 10, 7, 10, 11, 7]);
        // poles
        assert_abs_diff_eq!(mesh.vertices[0].position.y, 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(mesh.vertices[11].position.y, -1.0, epsilon = 1e-6);
    }

    #[test]
    fn generation_is_deterministic() {
        let a = generate_sphere(Vec3::X, Quat::from_rotation_y(0.3), 2.0, RED, 5, 9);
        let b = generate_sphere(Vec3::X, Quat::from_rotation_y(0.3), 2.0, RED, 5, 9);
        assert_eq!(a, b);
        let c = generate_box(Vec3::Y, Quat::IDENTITY, 1.0, 2.0, 3.0, RED);
        let d = generate_box(Vec3::Y, Quat::IDENTITY, 1.0, 2.0, 3.0, RED);
        assert_eq!(c, d);
    }

    #[test]
    fn bounds_cover_box() {
        let mesh = generate_box(Vec3::new(0.0, -1.0, 0.0), Quat::IDENTITY, 10.0, 1.0, 10.0, RED);
        let (min, max) = mesh.bounds().unwrap();
        assert!(min.abs_diff_eq(Vec3::new(-5.0, -1.5, -5.0), 1e-5));
        assert!(max.abs_diff_eq(Vec3::new(5.0, -0.5, 5.0), 1e-5));
    }

    #[test]
    fn line_segment_vertices() {
        let line = LineSegment::new(Vec3::ZERO, Vec3::new(3.0, 4.0, 0.0), RED);
        let [a, b] = line.vertices();
        assert_eq!(a.position, Vec3::ZERO);
        assert_eq!(b.position, Vec3::new(3.0, 4.0, 0.0));
        assert_eq!(a.normal, Vec3::ZERO);
        assert_eq!(b.color, RED);
        assert_abs_diff_eq!(line.length(), 5.0, epsilon = 1e-6);
    }
}
