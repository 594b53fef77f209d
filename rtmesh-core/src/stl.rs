/// STL loader (binary and ASCII) producing a welded `Trimesh`
use std::collections::HashMap;

use nalgebra::Point3;
use nom::{
    bytes::complete::tag,
    character::complete::{multispace0, multispace1, not_line_ending},
    multi::many0,
    number::complete::double,
    sequence::preceded,
    IResult,
};
use tracing::{debug, info};

use crate::error::{StlError, StlResult};
use crate::material::Material;
use crate::mesh::Trimesh;
use crate::transform::Transform;

const HEADER_LEN: usize = 80;
const FACET_LEN: usize = 50;

type Facet = [Point3<f64>; 3];

/// Parse a binary STL file
pub fn parse_binary_stl(data: &[u8], material: Material) -> StlResult<Trimesh> {
    let facets = read_binary_facets(data)?;
    build_mesh(&facets, material)
}

fn read_binary_facets(data: &[u8]) -> StlResult<Vec<Facet>> {
    if data.len() < HEADER_LEN + 4 {
        return Err(StlError::TooSmall { len: data.len() });
    }

    let body = &data[HEADER_LEN..];
    let count = u32::from_le_bytes([body[0], body[1], body[2], body[3]]) as usize;
    let expected = HEADER_LEN + 4 + count * FACET_LEN;
    if data.len() < expected {
        return Err(StlError::Truncated {
            expected,
            actual: data.len(),
        });
    }

    let facets = body[4..]
        .chunks_exact(FACET_LEN)
        .take(count)
        .map(|record| {
            // 12 bytes of facet normal, then three vertices; trailing 2 attribute bytes ignored
            let corner = |i: usize| {
                let at = 12 + i * 12;
                Point3::new(
                    read_f32(record, at),
                    read_f32(record, at + 4),
                    read_f32(record, at + 8),
                )
            };
            [corner(0), corner(1), corner(2)]
        })
        .collect();
    Ok(facets)
}

fn read_f32(data: &[u8], at: usize) -> f64 {
    f64::from(f32::from_le_bytes([
        data[at],
        data[at + 1],
        data[at + 2],
        data[at + 3],
    ]))
}

/// Parse an ASCII STL file
pub fn parse_ascii_stl(input: &str, material: Material) -> StlResult<Trimesh> {
    let (_, facets) = parse_solid(input).map_err(|e| StlError::Ascii(e.to_string()))?;
    build_mesh(&facets, material)
}

fn parse_solid(input: &str) -> IResult<&str, Vec<Facet>> {
    let (input, _) = preceded(multispace0, tag("solid"))(input)?;
    let (input, _) = not_line_ending(input)?; // Optional name
    let (input, facets) = many0(parse_facet)(input)?;
    let (input, _) = preceded(multispace0, tag("endsolid"))(input)?;
    Ok((input, facets))
}

fn parse_facet(input: &str) -> IResult<&str, Facet> {
    let (input, _) = preceded(multispace0, tag("facet"))(input)?;
    let (input, _) = preceded(multispace1, tag("normal"))(input)?;
    // Facet normals are recomputed from the winding
    let (input, _) = parse_point(input)?;
    let (input, _) = preceded(multispace0, tag("outer"))(input)?;
    let (input, _) = preceded(multispace1, tag("loop"))(input)?;
    let (input, a) = parse_vertex(input)?;
    let (input, b) = parse_vertex(input)?;
    let (input, c) = parse_vertex(input)?;
    let (input, _) = preceded(multispace0, tag("endloop"))(input)?;
    let (input, _) = preceded(multispace0, tag("endfacet"))(input)?;

    Ok((input, [a, b, c]))
}

fn parse_vertex(input: &str) -> IResult<&str, Point3<f64>> {
    let (input, _) = preceded(multispace0, tag("vertex"))(input)?;
    parse_point(input)
}

fn parse_point(input: &str) -> IResult<&str, Point3<f64>> {
    let (input, _) = multispace0(input)?;
    let (input, x) = double(input)?;
    let (input, _) = multispace1(input)?;
    let (input, y) = double(input)?;
    let (input, _) = multispace1(input)?;
    let (input, z) = double(input)?;
    Ok((input, Point3::new(x, y, z)))
}

/// Detect and parse STL file (binary or ASCII)
pub fn parse_stl(data: &[u8], material: Material) -> StlResult<Trimesh> {
    // Binary files may also start with "solid", so fall back on failure
    if data.starts_with(b"solid") {
        if let Ok(text) = std::str::from_utf8(data) {
            match parse_ascii_stl(text, material.clone()) {
                Ok(mesh) => return Ok(mesh),
                Err(err) => debug!(%err, "not ASCII STL, trying binary"),
            }
        }
    }

    parse_binary_stl(data, material)
}

/// Turn facet soup into an indexed mesh, sharing bit-identical corners.
fn build_mesh(facets: &[Facet], material: Material) -> StlResult<Trimesh> {
    let mut mesh = Trimesh::with_capacity(
        facets.len() * 3,
        facets.len(),
        material,
        Transform::identity(),
    );
    let mut index: HashMap<[u64; 3], usize> = HashMap::new();
    let mut dropped = 0usize;

    for &facet in facets {
        let ids = facet.map(|p| {
            let key = [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()];
            *index.entry(key).or_insert_with(|| {
                mesh.add_vertex(p);
                mesh.vertices().len() - 1
            })
        });
        if mesh.try_add_face(ids[0], ids[1], ids[2])?.is_none() {
            dropped += 1;
        }
    }

    info!(
        facets = facets.len(),
        vertices = mesh.vertices().len(),
        faces = mesh.face_count(),
        dropped,
        "loaded STL"
    );
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::SceneObject;
    use crate::ray::{Isect, Ray};
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    const TETRA: &str = "solid tetra
  facet normal 0 0 -1
    outer loop
      vertex 0 0 0
      vertex 0 1 0
      vertex 1 0 0
    endloop
  endfacet
  facet normal 0 -1 0
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 0 1
    endloop
  endfacet
  facet normal -1 0 0
    outer loop
      vertex 0 0 0
      vertex 0 0 1
      vertex 0 1 0
    endloop
  endfacet
  facet normal 1 1 1
    outer loop
      vertex 1 0 0
      vertex 0 1 0
      vertex 0 0 1
    endloop
  endfacet
endsolid tetra
";

    fn binary(facets: &[[[f32; 3]; 3]]) -> Vec<u8> {
        let mut data = vec![0u8; HEADER_LEN];
        data.extend_from_slice(&(facets.len() as u32).to_le_bytes());
        for facet in facets {
            data.extend_from_slice(&[0u8; 12]);
            for corner in facet {
                for v in corner {
                    data.extend_from_slice(&v.to_le_bytes());
                }
            }
            data.extend_from_slice(&[0u8; 2]);
        }
        data
    }

    #[test]
    fn test_parse_binary_header() {
        let mut data = vec![0u8; 84];
        // Set triangle count to 0
        data[80..84].copy_from_slice(&0u32.to_le_bytes());

        let mesh = parse_binary_stl(&data, Material::default()).unwrap();
        assert_eq!(mesh.face_count(), 0);
        assert!(mesh.vertices().is_empty());
    }

    #[test]
    fn test_binary_too_small() {
        let err = parse_binary_stl(&[0u8; 10], Material::default()).unwrap_err();
        assert!(matches!(err, StlError::TooSmall { len: 10 }));
    }

    #[test]
    fn test_binary_truncated() {
        let mut data = binary(&[[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]]);
        data[80..84].copy_from_slice(&2u32.to_le_bytes());
        let err = parse_binary_stl(&data, Material::default()).unwrap_err();
        assert!(matches!(err, StlError::Truncated { expected: 184, actual: 134 }));
    }

    #[test]
    fn test_binary_welds_shared_corners() {
        let data = binary(&[
            [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]],
            [[0.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
            // Degenerate sliver
            [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]],
        ]);
        let mesh = parse_stl(&data, Material::default()).unwrap();
        assert_eq!(mesh.vertices().len(), 5);
        assert_eq!(mesh.face_count(), 2);
        assert!(mesh.double_check().is_none());
    }

    #[test]
    fn test_ascii_tetrahedron() {
        let mesh = parse_stl(TETRA.as_bytes(), Material::default()).unwrap();
        assert_eq!(mesh.vertices().len(), 4);
        assert_eq!(mesh.face_count(), 4);

        let mut isect = Isect::default();
        let ray = Ray::new(Point3::new(0.2, 0.2, 5.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(mesh.intersect(&ray, &mut isect));
        // Slanted face x + y + z = 1 is hit first
        assert_relative_eq!(isect.t, 4.4, epsilon = 1e-12);
    }

    #[test]
    fn test_ascii_generated_normals_point_outward() {
        let mut mesh = parse_ascii_stl(TETRA, Material::default()).unwrap();
        mesh.generate_normals();
        // Corner at the origin averages the three axis-aligned faces
        assert_relative_eq!(
            mesh.normals()[0],
            Vector3::new(-1.0, -1.0, -1.0) / 3.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_ascii_garbage() {
        let err = parse_ascii_stl("solid nope\n  facet sideways\nendsolid", Material::default())
            .unwrap_err();
        assert!(matches!(err, StlError::Ascii(_)));
    }
}
