//! Ray-mesh intersection for surface painting.
//!
//! This module provides ray-triangle intersection using the Moller-Trumbore algorithm,
//! a mesh tree mirroring the displayed model's node hierarchy, and nearest-hit
//! queries that interpolate texture coordinates at the hit point.

use glam::{Mat4, Vec2, Vec3};

/// Epsilon for floating point comparisons in ray intersection
const EPSILON: f32 = 1e-6;

/// A ray with a world-space origin and (normalized) direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Point at parameter `t` along the ray
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Result of a ray-triangle intersection test
#[derive(Debug, Clone, Copy)]
pub struct TriangleHit {
    /// Distance along the ray to the intersection point
    pub t: f32,
    /// Barycentric coordinate u (weight for vertex 1)
    pub u: f32,
    /// Barycentric coordinate v (weight for vertex 2)
    pub v: f32,
}

/// Moller-Trumbore ray-triangle intersection algorithm.
///
/// Both faces of the triangle are hit. Returns the hit distance and
/// barycentric coordinates if the ray intersects the triangle in front of
/// its origin.
pub fn ray_triangle_intersection(
    ray_origin: Vec3,
    ray_dir: Vec3,
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
) -> Option<TriangleHit> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let pvec = ray_dir.cross(edge2);
    let det = edge1.dot(pvec);

    // Ray parallel to the triangle plane
    if det.abs() < EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let tvec = ray_origin - v0;

    let u = tvec.dot(pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let qvec = tvec.cross(edge1);
    let v = ray_dir.dot(qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(qvec) * inv_det;

    // Only accept hits in front of the ray
    if t < EPSILON {
        return None;
    }

    Some(TriangleHit { t, u, v })
}

/// Interpolate a Vec2 attribute (like UVs) using barycentric coordinates.
pub fn interpolate_vec2(v0: Vec2, v1: Vec2, v2: Vec2, u: f32, v: f32) -> Vec2 {
    let w = 1.0 - u - v;
    v0 * w + v1 * u + v2 * v
}

/// Indexed triangle geometry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    /// Vertex positions
    pub positions: Vec<Vec3>,
    /// Triangle indices (3 per triangle)
    pub indices: Vec<u32>,
    /// Vertex UVs (same length as positions, or empty if the mesh has no UV channel)
    pub uvs: Vec<Vec2>,
}

impl TriangleMesh {
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>, uvs: Vec<Vec2>) -> Self {
        debug_assert!(indices.len() % 3 == 0);
        debug_assert!(uvs.is_empty() || uvs.len() == positions.len());
        Self {
            positions,
            indices,
            uvs,
        }
    }

    /// Get the number of triangles in the mesh
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn has_uvs(&self) -> bool {
        !self.uvs.is_empty()
    }

    /// The same geometry with its UV channel dropped
    pub fn without_uvs(mut self) -> Self {
        self.uvs.clear();
        self
    }

    /// Get the vertex indices for a triangle
    pub fn triangle_indices(&self, tri_index: usize) -> (usize, usize, usize) {
        let base = tri_index * 3;
        (
            self.indices[base] as usize,
            self.indices[base + 1] as usize,
            self.indices[base + 2] as usize,
        )
    }

    /// Get the vertex positions for a triangle
    pub fn triangle_positions(&self, tri_index: usize) -> (Vec3, Vec3, Vec3) {
        let (i0, i1, i2) = self.triangle_indices(tri_index);
        (self.positions[i0], self.positions[i1], self.positions[i2])
    }

    /// Axis-aligned bounds of the positions as (min, max)
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.positions.first()?;
        Some(
            self.positions
                .iter()
                .fold((first, first), |(lo, hi), p| (lo.min(*p), hi.max(*p))),
        )
    }
}

/// Closest hit of a ray against a mesh or mesh tree
#[derive(Debug, Clone, Copy)]
pub struct MeshHit {
    /// Distance along the world-space ray
    pub distance: f32,
    /// World position of the hit
    pub world_pos: Vec3,
    /// Triangle index within the hit mesh
    pub face_id: u32,
    /// Interpolated texture coordinate, None if the mesh has no UVs
    pub uv: Option<Vec2>,
}

/// Cast a ray against mesh data and return the closest hit.
///
/// `ray_dir` need not be normalized; the returned distance is expressed in
/// multiples of `ray_dir`, which lets callers transform rays between spaces
/// and still compare hits.
pub fn raycast_mesh(ray_origin: Vec3, ray_dir: Vec3, mesh: &TriangleMesh) -> Option<MeshHit> {
    let mut closest_hit: Option<(TriangleHit, usize)> = None;

    // Test all triangles (brute force - consider BVH for large meshes)
    for tri_idx in 0..mesh.triangle_count() {
        let (v0, v1, v2) = mesh.triangle_positions(tri_idx);

        if let Some(hit) = ray_triangle_intersection(ray_origin, ray_dir, v0, v1, v2) {
            let dominated = match &closest_hit {
                Some((prev, _)) => hit.t >= prev.t,
                None => false,
            };
            if !dominated {
                closest_hit = Some((hit, tri_idx));
            }
        }
    }

    closest_hit.map(|(hit, tri_idx)| {
        let uv = if mesh.has_uvs() {
            let (i0, i1, i2) = mesh.triangle_indices(tri_idx);
            Some(interpolate_vec2(
                mesh.uvs[i0],
                mesh.uvs[i1],
                mesh.uvs[i2],
                hit.u,
                hit.v,
            ))
        } else {
            None
        };

        MeshHit {
            distance: hit.t,
            world_pos: ray_origin + ray_dir * hit.t,
            face_id: tri_idx as u32,
            uv,
        }
    })
}

/// A node of the displayed model: local transform, optional geometry, children
#[derive(Debug, Clone)]
pub struct MeshNode {
    pub transform: Mat4,
    pub mesh: Option<TriangleMesh>,
    pub children: Vec<MeshNode>,
}

impl Default for MeshNode {
    fn default() -> Self {
        Self::group(Mat4::IDENTITY, Vec::new())
    }
}

impl MeshNode {
    /// A leaf node holding geometry
    pub fn from_mesh(mesh: TriangleMesh) -> Self {
        Self {
            transform: Mat4::IDENTITY,
            mesh: Some(mesh),
            children: Vec::new(),
        }
    }

    /// A node that only groups children
    pub fn group(transform: Mat4, children: Vec<MeshNode>) -> Self {
        Self {
            transform,
            mesh: None,
            children,
        }
    }

    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    /// Visit every mesh in the tree together with its world transform
    pub fn visit_meshes<'a>(&'a self, parent: Mat4, f: &mut impl FnMut(&'a TriangleMesh, Mat4)) {
        let world = parent * self.transform;
        if let Some(mesh) = &self.mesh {
            f(mesh, world);
        }
        for child in &self.children {
            child.visit_meshes(world, f);
        }
    }

    /// World-space axis-aligned bounds of every vertex in the tree
    pub fn world_bounds(&self, parent: Mat4) -> Option<(Vec3, Vec3)> {
        let mut bounds: Option<(Vec3, Vec3)> = None;
        self.visit_meshes(parent, &mut |mesh, world| {
            for p in &mesh.positions {
                let p = world.transform_point3(*p);
                bounds = Some(match bounds {
                    Some((lo, hi)) => (lo.min(p), hi.max(p)),
                    None => (p, p),
                });
            }
        });
        bounds
    }

    /// Nearest hit of a world-space ray against every mesh in the tree.
    ///
    /// The ray is carried into each mesh's local space; an affine map keeps
    /// the ray parameter unchanged, so distances stay comparable across nodes.
    /// Nodes with a collapsed (non-invertible) transform cannot be hit.
    pub fn raycast(&self, ray: &Ray) -> Option<MeshHit> {
        let mut nearest: Option<MeshHit> = None;
        self.visit_meshes(Mat4::IDENTITY, &mut |mesh, world| {
            let det = world.determinant();
            if det == 0.0 || !det.is_finite() {
                return;
            }
            let inverse = world.inverse();
            if !inverse.is_finite() {
                return;
            }
            let local_origin = inverse.transform_point3(ray.origin);
            let local_dir = inverse.transform_vector3(ray.direction);

            if let Some(mut hit) = raycast_mesh(local_origin, local_dir, mesh) {
                if nearest.is_some_and(|n| hit.distance >= n.distance) {
                    return;
                }
                hit.world_pos = ray.at(hit.distance);
                nearest = Some(hit);
            }
        });
        nearest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> (Vec3, Vec3, Vec3) {
        (
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        )
    }

    /// Quad in the XY plane at depth `z`, spanning [-1, 1] with full UV range
    fn quad(z: f32, with_uvs: bool) -> TriangleMesh {
        let positions = vec![
            Vec3::new(-1.0, -1.0, z),
            Vec3::new(1.0, -1.0, z),
            Vec3::new(1.0, 1.0, z),
            Vec3::new(-1.0, 1.0, z),
        ];
        let uvs = if with_uvs {
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(0.0, 1.0),
            ]
        } else {
            Vec::new()
        };
        TriangleMesh::new(positions, vec![0, 1, 2, 0, 2, 3], uvs)
    }

    #[test]
    fn test_ray_triangle_hit() {
        let (v0, v1, v2) = unit_triangle();

        // Ray pointing down at center of triangle
        let origin = Vec3::new(0.25, 0.25, 1.0);
        let dir = Vec3::new(0.0, 0.0, -1.0);

        let hit = ray_triangle_intersection(origin, dir, v0, v1, v2).unwrap();
        assert!((hit.t - 1.0).abs() < EPSILON);
        assert!((hit.u - 0.25).abs() < EPSILON);
        assert!((hit.v - 0.25).abs() < EPSILON);
    }

    #[test]
    fn test_ray_triangle_miss() {
        let (v0, v1, v2) = unit_triangle();
        let origin = Vec3::new(2.0, 2.0, 1.0);
        let dir = Vec3::new(0.0, 0.0, -1.0);
        assert!(ray_triangle_intersection(origin, dir, v0, v1, v2).is_none());
    }

    #[test]
    fn test_ray_triangle_behind() {
        let (v0, v1, v2) = unit_triangle();
        let origin = Vec3::new(0.25, 0.25, 1.0);
        let dir = Vec3::new(0.0, 0.0, 1.0);
        assert!(ray_triangle_intersection(origin, dir, v0, v1, v2).is_none());
    }

    #[test]
    fn test_ray_triangle_back_face() {
        let (v0, v1, v2) = unit_triangle();
        // From below the triangle, looking up
        let origin = Vec3::new(0.25, 0.25, -1.0);
        let dir = Vec3::new(0.0, 0.0, 1.0);
        assert!(ray_triangle_intersection(origin, dir, v0, v1, v2).is_some());
    }

    #[test]
    fn test_interpolate_vec2() {
        let v0 = Vec2::new(0.0, 0.0);
        let v1 = Vec2::new(1.0, 0.0);
        let v2 = Vec2::new(0.0, 1.0);

        assert!((interpolate_vec2(v0, v1, v2, 0.0, 0.0) - v0).length() < EPSILON);
        assert!((interpolate_vec2(v0, v1, v2, 1.0, 0.0) - v1).length() < EPSILON);
        assert!((interpolate_vec2(v0, v1, v2, 0.0, 1.0) - v2).length() < EPSILON);

        let center = (v0 + v1 + v2) / 3.0;
        let result = interpolate_vec2(v0, v1, v2, 1.0 / 3.0, 1.0 / 3.0);
        assert!((result - center).length() < EPSILON);
    }

    #[test]
    fn test_raycast_mesh_uv() {
        let mesh = quad(0.0, true);
        let hit = raycast_mesh(Vec3::new(0.5, -0.5, 3.0), Vec3::NEG_Z, &mesh).unwrap();

        assert!((hit.distance - 3.0).abs() < 1e-5);
        let uv = hit.uv.unwrap();
        assert!((uv - Vec2::new(0.75, 0.25)).length() < 1e-5);
    }

    #[test]
    fn test_raycast_mesh_without_uvs() {
        let mesh = quad(0.0, false);
        let hit = raycast_mesh(Vec3::new(0.0, 0.0, 3.0), Vec3::NEG_Z, &mesh).unwrap();
        assert!(hit.uv.is_none());
    }

    #[test]
    fn test_tree_picks_nearest() {
        // Far quad first in child order, near quad second
        let far = MeshNode::from_mesh(quad(-2.0, false));
        let near = MeshNode::from_mesh(quad(1.0, true));
        let root = MeshNode::group(Mat4::IDENTITY, vec![far, near]);

        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let hit = root.raycast(&ray).unwrap();
        assert!((hit.distance - 4.0).abs() < 1e-5);
        assert!(hit.uv.is_some());
        assert!((hit.world_pos - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn test_tree_respects_transforms() {
        let child = MeshNode::from_mesh(quad(0.0, true))
            .with_transform(Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0)));
        let root = MeshNode::group(Mat4::from_scale(Vec3::splat(2.0)), vec![child]);

        // Quad now covers x in [18, 22] at z = 0
        let miss = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        assert!(root.raycast(&miss).is_none());

        let ray = Ray::new(Vec3::new(21.0, 0.0, 5.0), Vec3::NEG_Z);
        let hit = root.raycast(&ray).unwrap();
        assert!((hit.distance - 5.0).abs() < 1e-4);
        let uv = hit.uv.unwrap();
        assert!((uv.x - 0.75).abs() < 1e-4);
    }

    #[test]
    fn test_collapsed_node_is_not_hit() {
        let root = MeshNode::group(Mat4::from_scale(Vec3::ZERO), vec![MeshNode::from_mesh(quad(0.0, true))]);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        assert!(root.raycast(&ray).is_none());
    }

    #[test]
    fn test_world_bounds() {
        let root = MeshNode::group(
            Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)),
            vec![MeshNode::from_mesh(quad(0.0, false))],
        );
        let (lo, hi) = root.world_bounds(Mat4::IDENTITY).unwrap();
        assert_eq!(lo, Vec3::new(0.0, 1.0, 3.0));
        assert_eq!(hi, Vec3::new(2.0, 3.0, 3.0));
        assert!(MeshNode::default().world_bounds(Mat4::IDENTITY).is_none());
    }
}
