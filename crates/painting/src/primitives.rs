//! Built-in geometry used when a model asset cannot be loaded

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

use crate::raycast::TriangleMesh;

/// Latitude/longitude sphere centered at the origin with a full UV wrap.
///
/// `u` runs around the equator and `v` from the south pole (0) to the north
/// pole (1), so the whole paint surface maps onto the sphere.
pub fn uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> TriangleMesh {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);

    let mut positions = Vec::new();
    let mut uvs = Vec::new();
    let mut grid = Vec::with_capacity(height_segments as usize + 1);

    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        // Pole rows get their u shifted half a segment so each pole triangle
        // samples the middle of its column
        let u_offset = match iy {
            0 => 0.5 / width_segments as f32,
            _ if iy == height_segments => -0.5 / width_segments as f32,
            _ => 0.0,
        };

        let mut row = Vec::with_capacity(width_segments as usize + 1);
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let phi = u * TAU;
            let theta = v * PI;
            positions.push(Vec3::new(
                -radius * phi.cos() * theta.sin(),
                radius * theta.cos(),
                radius * phi.sin() * theta.sin(),
            ));
            uvs.push(Vec2::new(u + u_offset, 1.0 - v));
            row.push(positions.len() as u32 - 1);
        }
        grid.push(row);
    }

    let mut indices = Vec::new();
    for iy in 0..height_segments as usize {
        for ix in 0..width_segments as usize {
            let a = grid[iy][ix + 1];
            let b = grid[iy][ix];
            let c = grid[iy + 1][ix];
            let d = grid[iy + 1][ix + 1];

            // Skip the zero-area halves of the pole quads
            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments as usize - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    TriangleMesh::new(positions, indices, uvs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raycast::{MeshNode, Ray};

    #[test]
    fn test_sphere_counts() {
        let sphere = uv_sphere(2.0, 8, 4);
        assert_eq!(sphere.positions.len(), 9 * 5);
        assert_eq!(sphere.uvs.len(), sphere.positions.len());
        // Two triangles per quad minus one per quad on each pole row
        assert_eq!(sphere.triangle_count(), 8 * 4 * 2 - 2 * 8);
    }

    #[test]
    fn test_sphere_radius() {
        let sphere = uv_sphere(2.0, 16, 8);
        for p in &sphere.positions {
            assert!((p.length() - 2.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_sphere_front_hit_uv() {
        let sphere = MeshNode::from_mesh(uv_sphere(2.0, 64, 64));
        // Slightly off the vertex where four facets meet
        let ray = Ray::new(Vec3::new(0.01, 0.013, 5.0), Vec3::NEG_Z);
        let hit = sphere.raycast(&ray).unwrap();

        assert!((hit.distance - 3.0).abs() < 0.01);
        let uv = hit.uv.unwrap();
        // The +Z meridian sits a quarter turn around, on the equator
        assert!((uv.x - 0.25).abs() < 0.02, "u = {}", uv.x);
        assert!((uv.y - 0.5).abs() < 0.02, "v = {}", uv.y);
    }
}
