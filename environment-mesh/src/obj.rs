//! Wavefront OBJ encoding and decoding for merged meshes.
//!
//! Only positions and faces are written. Face indices are 1-based as the format
//! requires; no normals or texture coordinates are emitted. The decoder reads
//! the same subset back and ignores everything else.
use crate::merged::MergedMesh;
use constants::export::OBJ_HEADER;
use glam::Vec3;
use std::io::{self, Write};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ObjError {
    #[error("line {line}: vertex needs three numeric coordinates")]
    InvalidVertex { line: usize },
    #[error("line {line}: face index '{token}' is not a positive integer")]
    InvalidFaceIndex { line: usize, token: String },
    #[error("line {line}: face has {corners} corners, only triangles are supported")]
    NotATriangle { line: usize, corners: usize },
    #[error("line {line}: face references vertex {index} but the file has {vertex_count}")]
    IndexOutOfRange {
        line: usize,
        index: usize,
        vertex_count: usize,
    },
}

/// Encode `mesh` as OBJ text.
pub fn encode_obj(mesh: &MergedMesh) -> String {
    let mut buffer = Vec::with_capacity(mesh.vertex_count() * 32 + mesh.triangle_count() * 24);
    // io::Write for Vec<u8> never fails.
    if write_obj(mesh, &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Stream `mesh` as OBJ into any writer.
pub fn write_obj<W: Write>(mesh: &MergedMesh, writer: &mut W) -> io::Result<()> {
    writeln!(writer, "{}", OBJ_HEADER)?;
    for v in &mesh.vertices {
        writeln!(writer, "v {} {} {}", v.x, v.y, v.z)?;
    }
    for t in &mesh.triangles {
        writeln!(writer, "f {} {} {}", t[0] + 1, t[1] + 1, t[2] + 1)?;
    }
    writer.flush()
}

/// Decode `v` and `f` lines of an OBJ file into a mesh.
///
/// Extra vertex components (colors, w) are ignored. Face corners may carry
/// texture and normal references (`a/b/c`); only the position index is used.
/// Faces may reference vertices declared later in the file.
pub fn parse_obj(text: &str) -> Result<MergedMesh, ObjError> {
    let mut mesh = MergedMesh::default();
    let mut face_lines = Vec::new();

    for (n, raw) in text.lines().enumerate() {
        let line = n + 1;
        let mut tokens = raw.split_whitespace();
        match tokens.next() {
            Some("v") => {
                let coords: Vec<f32> = tokens.take(3).filter_map(|t| t.parse().ok()).collect();
                let [x, y, z] = coords[..] else {
                    return Err(ObjError::InvalidVertex { line });
                };
                mesh.vertices.push(Vec3::new(x, y, z));
            }
            Some("f") => {
                let corners = tokens
                    .map(|token| parse_face_index(token, line))
                    .collect::<Result<Vec<usize>, _>>()?;
                let [a, b, c] = corners[..] else {
                    return Err(ObjError::NotATriangle {
                        line,
                        corners: corners.len(),
                    });
                };
                face_lines.push(line);
                mesh.triangles.push([a as u32, b as u32, c as u32]);
            }
            _ => {}
        }
    }

    let vertex_count = mesh.vertex_count();
    for (triangle, &line) in mesh.triangles.iter_mut().zip(&face_lines) {
        for index in triangle.iter_mut() {
            if *index as usize > vertex_count {
                return Err(ObjError::IndexOutOfRange {
                    line,
                    index: *index as usize,
                    vertex_count,
                });
            }
            *index -= 1;
        }
    }
    Ok(mesh)
}

/// 1-based position index of one face corner.
fn parse_face_index(token: &str, line: usize) -> Result<usize, ObjError> {
    let position = token.split('/').next().unwrap_or(token);
    match position.parse::<usize>() {
        Ok(index) if index > 0 && index <= u32::MAX as usize => Ok(index),
        _ => Err(ObjError::InvalidFaceIndex {
            line,
            token: token.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_triangle() -> MergedMesh {
        MergedMesh {
            vertices: vec![Vec3::ZERO, Vec3::new(1.5, 0.0, 0.0), Vec3::new(0.0, -2.0, 0.25)],
            triangles: vec![[0, 1, 2]],
        }
    }

    #[test]
    fn faces_are_one_based() {
        let text = encode_obj(&single_triangle());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], OBJ_HEADER);
        assert_eq!(lines[1], "v 0 0 0");
        assert_eq!(lines[2], "v 1.5 0 0");
        assert_eq!(lines[3], "v 0 -2 0.25");
        assert_eq!(lines[4], "f 1 2 3");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn writer_output_matches_string_encoding() {
        let mesh = single_triangle();
        let mut buffer = Vec::new();
        write_obj(&mesh, &mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), encode_obj(&mesh));
    }

    #[test]
    fn empty_mesh_is_only_the_header() {
        assert_eq!(encode_obj(&MergedMesh::default()), format!("{}\n", OBJ_HEADER));
    }

    #[test]
    fn exported_mesh_reads_back_unchanged() {
        let mesh = MergedMesh {
            vertices: vec![
                Vec3::ZERO,
                Vec3::new(1.5, 0.0, 0.0),
                Vec3::new(0.0, -2.0, 0.25),
                Vec3::new(3.0, 4.0, 5.0),
            ],
            triangles: vec![[0, 1, 2], [3, 2, 1]],
        };
        assert_eq!(parse_obj(&encode_obj(&mesh)).unwrap(), mesh);
    }

    #[test]
    fn face_corners_with_texture_and_normal_refs() {
        let text = "# exported elsewhere\n\
                    o room\n\
                    v 0 0 0 1 0 0\n\
                    v 1 0 0 0 1 0\n\
                    v 0 1 0 0 0 1\n\
                    vn 0 0 1\n\
                    f 1/1/1 2//1 3/2\n";
        let mesh = parse_obj(text).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangles, vec![[0, 1, 2]]);
    }

    #[test]
    fn faces_may_precede_their_vertices() {
        let mesh = parse_obj("f 1 2 3\nv 0 0 0\nv 1 0 0\nv 0 1 0\n").unwrap();
        assert_eq!(mesh.triangles, vec![[0, 1, 2]]);
    }

    #[test]
    fn rejects_malformed_lines() {
        assert_eq!(
            parse_obj("v 1 2\n").unwrap_err(),
            ObjError::InvalidVertex { line: 1 }
        );
        assert_eq!(
            parse_obj("v 0 0 0\nf 1 0 1\n").unwrap_err(),
            ObjError::InvalidFaceIndex {
                line: 2,
                token: "0".to_owned()
            }
        );
        assert_eq!(
            parse_obj("v 0 0 0\nf 1 1 1 1\n").unwrap_err(),
            ObjError::NotATriangle { line: 2, corners: 4 }
        );
        assert_eq!(
            parse_obj("v 0 0 0\nv 1 0 0\nf 1 2 3\n").unwrap_err(),
            ObjError::IndexOutOfRange {
                line: 3,
                index: 3,
                vertex_count: 2
            }
        );
    }
}
