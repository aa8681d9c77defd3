//! Wavefront OBJ parsing for mask models
//!
//! Supports the subset mask assets use: positions (`v`), texture
//! coordinates (`vt`) and faces (`f`). Normals, groups and materials are
//! skipped; every group is merged into a single mesh.

use std::collections::HashMap;

use glam::{Vec2, Vec3};
use thiserror::Error;

use crate::raycast::TriangleMesh;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ObjError {
    #[error("Line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("OBJ contains no faces")]
    Empty,
}

fn parse_error(line: usize, message: impl Into<String>) -> ObjError {
    ObjError::Parse {
        line,
        message: message.into(),
    }
}

/// Parse OBJ text into a triangle mesh.
///
/// Polygons are fan-triangulated. The mesh carries a UV channel when any
/// face vertex references a texture coordinate; vertices without one get
/// (0, 0).
pub fn parse_obj(contents: &str) -> Result<TriangleMesh, ObjError> {
    let mut positions: Vec<Vec3> = Vec::new();
    let mut tex_coords: Vec<Vec2> = Vec::new();

    // Unique (position, texcoord) pairs -> output vertex index
    let mut vertex_cache: HashMap<(usize, Option<usize>), u32> = HashMap::new();
    let mut corners: Vec<(usize, Option<usize>)> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();

    for (line_idx, raw) in contents.lines().enumerate() {
        let line_num = line_idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else {
            continue;
        };
        let args: Vec<&str> = parts.collect();

        match keyword {
            "v" => {
                if args.len() < 3 {
                    return Err(parse_error(line_num, "vertex position needs 3 values"));
                }
                positions.push(Vec3::new(
                    parse_float(args[0], line_num)?,
                    parse_float(args[1], line_num)?,
                    parse_float(args[2], line_num)?,
                ));
            }
            "vt" => {
                if args.is_empty() {
                    return Err(parse_error(line_num, "texture coordinate needs a value"));
                }
                let u = parse_float(args[0], line_num)?;
                let v = match args.get(1) {
                    Some(v) => parse_float(v, line_num)?,
                    None => 0.0,
                };
                tex_coords.push(Vec2::new(u, v));
            }
            "f" => {
                if args.len() < 3 {
                    return Err(parse_error(line_num, "face needs at least 3 vertices"));
                }

                let mut face = Vec::with_capacity(args.len());
                for token in &args {
                    let key = parse_face_vertex(token, line_num, positions.len(), tex_coords.len())?;
                    let index = match vertex_cache.get(&key) {
                        Some(&index) => index,
                        None => {
                            let index = corners.len() as u32;
                            corners.push(key);
                            vertex_cache.insert(key, index);
                            index
                        }
                    };
                    face.push(index);
                }

                // Fan triangulation from the first vertex
                for i in 1..face.len() - 1 {
                    indices.extend_from_slice(&[face[0], face[i], face[i + 1]]);
                }
            }
            // vn, o, g, s, usemtl, mtllib...
            _ => {}
        }
    }

    if indices.is_empty() {
        return Err(ObjError::Empty);
    }

    let has_uvs = corners.iter().any(|(_, vt)| vt.is_some());
    let mesh_positions = corners.iter().map(|(v, _)| positions[*v]).collect();
    let mesh_uvs = if has_uvs {
        corners
            .iter()
            .map(|(_, vt)| vt.map_or(Vec2::ZERO, |i| tex_coords[i]))
            .collect()
    } else {
        Vec::new()
    };

    Ok(TriangleMesh::new(mesh_positions, indices, mesh_uvs))
}

fn parse_float(token: &str, line: usize) -> Result<f32, ObjError> {
    token
        .parse::<f32>()
        .map_err(|_| parse_error(line, format!("invalid number '{}'", token)))
}

/// Resolve a 1-based (or negative, relative) OBJ index against `count` entries
fn resolve_index(token: &str, count: usize, line: usize) -> Result<usize, ObjError> {
    let raw: i64 = token
        .parse()
        .map_err(|_| parse_error(line, format!("invalid index '{}'", token)))?;
    let resolved = match raw {
        0 => None,
        r if r > 0 => Some(r - 1),
        r => Some(count as i64 + r),
    };
    match resolved {
        Some(i) if i >= 0 && (i as usize) < count => Ok(i as usize),
        _ => Err(parse_error(line, format!("index {} out of range", raw))),
    }
}

/// Parse `v`, `v/vt`, `v//vn` or `v/vt/vn`
fn parse_face_vertex(
    token: &str,
    line: usize,
    position_count: usize,
    tex_coord_count: usize,
) -> Result<(usize, Option<usize>), ObjError> {
    let mut fields = token.split('/');
    let position = match fields.next() {
        Some(p) if !p.is_empty() => resolve_index(p, position_count, line)?,
        _ => return Err(parse_error(line, format!("missing position in '{}'", token))),
    };
    let tex_coord = match fields.next() {
        Some(t) if !t.is_empty() => Some(resolve_index(t, tex_coord_count, line)?),
        _ => None,
    };
    Ok((position, tex_coord))
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
# textured quad
o Quad
v -1 -1 0
v 1 -1 0
v 1 1 0
v -1 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    #[test]
    fn test_parse_textured_quad() {
        let mesh = parse_obj(QUAD).unwrap();
        assert_eq!(mesh.positions.len(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert!(mesh.has_uvs());
        assert_eq!(mesh.uvs[2], Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_parse_untextured() {
        let mesh = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        assert_eq!(mesh.triangle_count(), 1);
        assert!(!mesh.has_uvs());
    }

    #[test]
    fn test_negative_indices_and_normals_only() {
        let mesh = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf -3//1 -2//1 -1//1\n").unwrap();
        assert_eq!(mesh.positions[0], Vec3::ZERO);
        assert_eq!(mesh.positions[2], Vec3::new(0.0, 1.0, 0.0));
        assert!(!mesh.has_uvs());
    }

    #[test]
    fn test_shared_corners_are_deduplicated() {
        let src = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3\nf 1 3 4\n";
        let mesh = parse_obj(src).unwrap();
        assert_eq!(mesh.positions.len(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse_obj("v 0 0 0\n"), Err(ObjError::Empty));
        assert!(matches!(
            parse_obj("v 0 0\n"),
            Err(ObjError::Parse { line: 1, .. })
        ));
        assert!(matches!(
            parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 9\n"),
            Err(ObjError::Parse { line: 4, .. })
        ));
        assert!(matches!(
            parse_obj("v 0 0 0\nv x 0 0\n"),
            Err(ObjError::Parse { line: 2, .. })
        ));
    }
}
