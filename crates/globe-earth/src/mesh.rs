//! Icosphere mesh shared by every globe layer.
//!
//! Each icosahedron edge is split into `detail + 1` segments and the resulting
//! triangular grid is projected onto the unit sphere, giving `20 * (detail + 1)^2`
//! triangles. Vertices are kept per face so a face straddling the texture seam
//! can have its U coordinates unwrapped without affecting its neighbors.

use glam::Vec3;
use globe_render::VertexPositionNormalUv;
use std::f32::consts::{PI, TAU};

/// Default tessellation detail.
pub const DEFAULT_DETAIL: u32 = 12;

/// CPU-side sphere geometry ready for upload.
pub struct SphereMesh {
    pub vertices: Vec<VertexPositionNormalUv>,
    pub indices: Vec<u32>,
}

impl SphereMesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

const ICOSAHEDRON_FACES: [[usize; 3]; 20] = [
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

fn icosahedron_corners() -> [Vec3; 12] {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
    [
        Vec3::new(-1.0, t, 0.0),
        Vec3::new(1.0, t, 0.0),
        Vec3::new(-1.0, -t, 0.0),
        Vec3::new(1.0, -t, 0.0),
        Vec3::new(0.0, -1.0, t),
        Vec3::new(0.0, 1.0, t),
        Vec3::new(0.0, -1.0, -t),
        Vec3::new(0.0, 1.0, -t),
        Vec3::new(t, 0.0, -1.0),
        Vec3::new(t, 0.0, 1.0),
        Vec3::new(-t, 0.0, -1.0),
        Vec3::new(-t, 0.0, 1.0),
    ]
    .map(Vec3::normalize)
}

/// Equirectangular UV for a point on the unit sphere.
///
/// U runs eastward from the -X meridian with +Z at 0.75; V is 0 at the north pole.
pub fn sphere_uv(p: Vec3) -> [f32; 2] {
    let u = 0.5 + p.z.atan2(-p.x) / TAU;
    let v = 0.5 - p.y.clamp(-1.0, 1.0).asin() / PI;
    [u, v]
}

/// Build an icosphere whose edges are split into `detail + 1` segments.
pub fn icosphere(detail: u32) -> SphereMesh {
    let corners = icosahedron_corners();
    let n = detail + 1;
    let per_face_vertices = ((n + 1) * (n + 2) / 2) as usize;
    let mut vertices = Vec::with_capacity(20 * per_face_vertices);
    let mut indices = Vec::with_capacity(20 * 3 * (n * n) as usize);

    for face in ICOSAHEDRON_FACES {
        let [a, b, c] = face.map(|i| corners[i]);
        let base = vertices.len() as u32;

        // Row i walks from a towards b, column j from a towards c.
        let mut face_vertices = Vec::with_capacity(per_face_vertices);
        for i in 0..=n {
            for j in 0..=(n - i) {
                let p = a + (b - a) * (i as f32 / n as f32) + (c - a) * (j as f32 / n as f32);
                face_vertices.push(p.normalize());
            }
        }

        let reference_u = sphere_uv((a + b + c).normalize())[0];
        let uvs: Vec<[f32; 2]> = face_vertices
            .iter()
            .map(|p| unwrap_u(sphere_uv(*p), reference_u))
            .collect();

        vertices.extend(face_vertices.iter().zip(&uvs).map(|(p, uv)| VertexPositionNormalUv {
            position: p.to_array(),
            normal: p.to_array(),
            uv: *uv,
        }));

        let index = |i: u32, j: u32| base + row_start(i, n) + j;
        for i in 0..n {
            for j in 0..(n - i) {
                indices.extend_from_slice(&[index(i, j), index(i + 1, j), index(i, j + 1)]);
                if j + 1 < n - i {
                    indices.extend_from_slice(&[
                        index(i + 1, j),
                        index(i + 1, j + 1),
                        index(i, j + 1),
                    ]);
                }
            }
        }
    }

    log::debug!(
        "Built icosphere detail {detail}: {} vertices, {} triangles",
        vertices.len(),
        indices.len() / 3
    );

    SphereMesh { vertices, indices }
}

/// Offset of row `i` in a face's triangular vertex grid of `n` segments.
fn row_start(i: u32, n: u32) -> u32 {
    // Row k holds n + 1 - k vertices.
    i * (n + 1) - i * (i.saturating_sub(1)) / 2
}

/// Move `uv` to the copy of U nearest the face's reference U, so a face that
/// crosses the U=0/1 seam interpolates across the seam instead of the whole
/// texture. The sampler repeats horizontally.
fn unwrap_u(uv: [f32; 2], reference_u: f32) -> [f32; 2] {
    let [mut u, v] = uv;
    if u - reference_u > 0.5 {
        u -= 1.0;
    } else if reference_u - u > 0.5 {
        u += 1.0;
    }
    [u, v]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangle_count_follows_detail() {
        assert_eq!(icosphere(0).triangle_count(), 20);
        assert_eq!(icosphere(1).triangle_count(), 80);
        assert_eq!(icosphere(12).triangle_count(), 20 * 13 * 13);
    }

    #[test]
    fn test_vertices_on_unit_sphere() {
        let mesh = icosphere(4);
        for v in &mesh.vertices {
            let len = Vec3::from(v.position).length();
            assert!((len - 1.0).abs() < 1e-5, "vertex at length {len}");
            assert_eq!(v.position, v.normal);
        }
    }

    #[test]
    fn test_indices_valid() {
        let mesh = icosphere(5);
        let n = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < n));
    }

    #[test]
    fn test_row_start_offsets() {
        // n = 3: rows hold 4, 3, 2, 1 vertices.
        assert_eq!(row_start(0, 3), 0);
        assert_eq!(row_start(1, 3), 4);
        assert_eq!(row_start(2, 3), 7);
        assert_eq!(row_start(3, 3), 9);
    }

    #[test]
    fn test_triangles_wind_outward() {
        let mesh = icosphere(2);
        for tri in mesh.indices.chunks(3) {
            let [a, b, c] =
                [tri[0], tri[1], tri[2]].map(|i| Vec3::from(mesh.vertices[i as usize].position));
            let normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(normal.dot(centroid) > 0.0, "triangle {tri:?} winds inward");
        }
    }

    #[test]
    fn test_uv_pole_and_front() {
        assert!(sphere_uv(Vec3::Y)[1].abs() < 1e-6);
        assert!((sphere_uv(Vec3::NEG_Y)[1] - 1.0).abs() < 1e-6);
        let front = sphere_uv(Vec3::Z);
        assert!((front[0] - 0.75).abs() < 1e-6);
        assert!((front[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_no_triangle_spans_the_seam() {
        let mesh = icosphere(DEFAULT_DETAIL);
        for tri in mesh.indices.chunks(3) {
            let corners: Vec<_> = tri.iter().map(|&i| mesh.vertices[i as usize]).collect();
            // Longitude is degenerate at the poles.
            if corners.iter().any(|v| v.position[1].abs() > 0.95) {
                continue;
            }
            let us: Vec<f32> = corners.iter().map(|v| v.uv[0]).collect();
            let span = us.iter().cloned().fold(f32::MIN, f32::max)
                - us.iter().cloned().fold(f32::MAX, f32::min);
            assert!(span <= 0.5, "triangle spans u range {span}");
        }
    }

    #[test]
    fn test_unwrap_u_moves_towards_reference() {
        assert!((unwrap_u([0.02, 0.5], 0.98)[0] - 1.02).abs() < 1e-6);
        assert!(unwrap_u([1.0, 0.5], 0.25)[0].abs() < 1e-6);
        assert_eq!(unwrap_u([0.4, 0.5], 0.6), [0.4, 0.5]);
    }

    #[test]
    fn test_v_in_range() {
        let mesh = icosphere(3);
        for v in &mesh.vertices {
            assert!((0.0..=1.0).contains(&v.uv[1]));
            assert!((-0.5..=1.5).contains(&v.uv[0]));
        }
    }
}
