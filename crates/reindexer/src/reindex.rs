//! Turns separately indexed attributes into one shared index.
//!
//! Every corner of every face is resolved to the attribute values it references. Corners whose
//! values are bitwise identical (after canonicalization) share one output vertex, so two
//! different `v` lines holding the same coordinates collapse as well. Output vertices are
//! numbered in the order their values are first seen.

use std::collections::HashMap;
use std::fmt;

use gfx_maths::{Vec2, Vec3};
use log::{debug, info, warn};
use oo_format::IndexedMesh;

use crate::error::{ReindexError, Result};
use crate::mesh::obj::{Geometry, MultiIndex};

/// Number of distinct vertices addressable by 16-bit indices.
pub const MAX_VERTICES: usize = u16::MAX as usize + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Position,
    TexCoord,
    Normal,
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Position => write!(f, "Position"),
            Attribute::TexCoord => write!(f, "Texture coordinate"),
            Attribute::Normal => write!(f, "Normal"),
        }
    }
}

/// Bit patterns of the resolved scalars, position then texture coordinate then normal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalKey(Vec<u32>);

impl CanonicalKey {
    pub fn scalars(&self) -> impl Iterator<Item = f32> + '_ {
        self.0.iter().map(|bits| f32::from_bits(*bits))
    }
}

/// The attribute values a multi-index points at.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Resolved {
    position: Vec3,
    texcoord: Option<Vec2>,
    normal: Option<Vec3>,
}

impl Resolved {
    fn resolve(geometry: &Geometry, index: &MultiIndex) -> Result<Self> {
        Ok(Resolved {
            position: fetch(&geometry.positions, index.position(), Attribute::Position)?,
            texcoord: index
                .texcoord()
                .map(|t| fetch(&geometry.texcoords, t, Attribute::TexCoord))
                .transpose()?,
            normal: index
                .normal()
                .map(|n| fetch(&geometry.normals, n, Attribute::Normal))
                .transpose()?,
        })
    }

    fn key(&self) -> CanonicalKey {
        let mut bits = Vec::with_capacity(8);
        bits.extend(&[self.position.x, self.position.y, self.position.z]);
        if let Some(uv) = self.texcoord {
            bits.extend(&[uv.x, uv.y]);
        }
        if let Some(normal) = self.normal {
            bits.extend(&[normal.x, normal.y, normal.z]);
        }
        CanonicalKey(bits.into_iter().map(f32::to_bits).collect())
    }
}

// 1-based lookup
fn fetch<T: Copy>(items: &[T], index: usize, attribute: Attribute) -> Result<T> {
    index
        .checked_sub(1)
        .and_then(|i| items.get(i))
        .copied()
        .ok_or(ReindexError::IndexOutOfRange {
            attribute,
            index,
            len: items.len(),
        })
}

/// Deduplicates the face corners of `geometry` into an [`IndexedMesh`].
///
/// Fails if a corner references an attribute that was never parsed, or if more than
/// [`MAX_VERTICES`] distinct vertices are found.
pub fn reindex(geometry: &Geometry) -> Result<IndexedMesh> {
    let mut seen: HashMap<CanonicalKey, u16> = HashMap::new();
    let mut mesh = IndexedMesh {
        indices: Vec::with_capacity(geometry.multi_indices.len()),
        ..IndexedMesh::default()
    };

    let mut layout: Option<usize> = None;
    for multi_index in &geometry.multi_indices {
        match layout {
            None => layout = Some(multi_index.arity()),
            Some(arity) if arity != multi_index.arity() => {
                warn!(
                    "Mixed face layouts: `{}` after faces of arity {}, attribute arrays will not line up",
                    multi_index, arity
                );
                layout = Some(multi_index.arity());
            }
            Some(_) => {}
        }

        let resolved = Resolved::resolve(geometry, multi_index)?;
        let key = resolved.key();

        let index = match seen.get(&key) {
            Some(&index) => index,
            None => {
                let index = u16::try_from(seen.len()).map_err(|_| ReindexError::CapacityExceeded {
                    max: MAX_VERTICES,
                })?;
                debug!("New vertex {} for `{}`", index, multi_index);

                mesh.positions.push(resolved.position);
                if let Some(uv) = resolved.texcoord {
                    mesh.texcoords.push(uv);
                }
                if let Some(normal) = resolved.normal {
                    mesh.normals.push(normal);
                }
                seen.insert(key, index);
                index
            }
        };
        mesh.indices.push(index);
    }

    info!(
        "Reindexed {} face vertices into {} unique vertices",
        mesh.indices.len(),
        mesh.positions.len()
    );

    Ok(mesh)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mesh::obj::{parser::parse_str, Face, ObjMeta};
    use quickcheck_macros::quickcheck;
    use std::collections::HashSet;

    fn geometry(source: &str) -> Geometry {
        parse_str(source, &ObjMeta::default()).unwrap().geometry
    }

    const TRIANGLE: &str = "v 0 0 0\nv 1 0 0\nv 1 1 0\nvn 0 0 1\n";

    #[test]
    fn test_triangle() -> Result<()> {
        let mesh = reindex(&geometry(&format!("{}f 1//1 2//1 3//1\n", TRIANGLE)))?;

        assert_eq!(
            mesh.positions,
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0)
            ]
        );
        assert_eq!(mesh.normals, vec![Vec3::new(0.0, 0.0, 1.0); 3]);
        assert!(mesh.texcoords.is_empty());
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        Ok(())
    }

    #[test]
    fn test_repeated_corner() -> Result<()> {
        let mesh = reindex(&geometry(&format!("{}f 1//1 2//1 3//1 1//1\n", TRIANGLE)))?;

        assert_eq!(mesh.indices, vec![0, 1, 2, 0]);
        assert_eq!(mesh.positions.len(), 3);
        assert_eq!(mesh.normals.len(), 3);
        Ok(())
    }

    #[test]
    fn test_dedup_by_value() -> Result<()> {
        // positions 1 and 4 hold the same coordinates, normals 1 and 2 as well
        let source = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0.0000001 -0 0\nvn 0 0 1\nvn 0 0 1\nvt 0 0\nvt 1 0\nvt 1 1\n\
                      f 1/1/1 2/2/1 3/3/1\nf 4/1/2 3/3/2 2/2/1\n";
        let mesh = reindex(&geometry(source))?;

        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 1]);
        assert_eq!(mesh.positions.len(), 3);
        assert_eq!(mesh.texcoords.len(), 3);
        assert_eq!(mesh.normals.len(), 3);
        Ok(())
    }

    #[test]
    fn test_same_position_different_normal() -> Result<()> {
        let source = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nvn 0 0 -1\nf 1//1 2//1 3//1\nf 1//2 3//2 2//2\n";
        let mesh = reindex(&geometry(source))?;

        assert_eq!(mesh.indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(mesh.positions[0], mesh.positions[3]);
        assert_ne!(mesh.normals[0], mesh.normals[3]);
        Ok(())
    }

    #[test]
    fn test_position_only() -> Result<()> {
        let mesh = reindex(&geometry("v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3\nf 1 3 4\n"))?;

        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.positions.len(), 4);
        assert!(mesh.normals.is_empty());
        assert!(mesh.texcoords.is_empty());
        Ok(())
    }

    #[test]
    fn test_index_out_of_range() {
        let cases = [
            ("f 4//1 2//1 3//1\n", Attribute::Position, 4, 3),
            ("f 1//2 2//1 3//1\n", Attribute::Normal, 2, 1),
            ("f 1/1/1 2/1/1 3/1/1\n", Attribute::TexCoord, 1, 0),
        ];

        for (face, expected_attribute, expected_index, expected_len) in &cases {
            match reindex(&geometry(&format!("{}{}", TRIANGLE, face))) {
                Err(ReindexError::IndexOutOfRange {
                    attribute,
                    index,
                    len,
                }) => {
                    assert_eq!(attribute, *expected_attribute);
                    assert_eq!(index, *expected_index);
                    assert_eq!(len, *expected_len);
                }
                other => panic!("unexpected result for {:?}: {:?}", face, other),
            }
        }
    }

    #[test]
    fn test_zero_index() {
        // the parser never produces it, but geometry can be built by hand
        let geometry = Geometry::new(
            vec![Vec3::new(0.0, 0.0, 0.0)],
            Vec::new(),
            Vec::new(),
            vec![Face {
                indices: vec![MultiIndex::Position(0)],
            }],
        );
        assert!(matches!(
            reindex(&geometry),
            Err(ReindexError::IndexOutOfRange { index: 0, .. })
        ));
    }

    fn points(count: usize) -> Geometry {
        let positions = (0..count).map(|i| Vec3::new(i as f32, 0.0, 0.0)).collect();
        let faces = (1..=count)
            .map(|p| Face {
                indices: vec![MultiIndex::Position(p)],
            })
            .collect();
        Geometry::new(positions, Vec::new(), Vec::new(), faces)
    }

    #[test]
    fn test_capacity() -> Result<()> {
        let mesh = reindex(&points(MAX_VERTICES))?;
        assert_eq!(mesh.positions.len(), MAX_VERTICES);
        assert_eq!(mesh.indices.last(), Some(&u16::MAX));

        assert!(matches!(
            reindex(&points(MAX_VERTICES + 1)),
            Err(ReindexError::CapacityExceeded { max: MAX_VERTICES })
        ));
        Ok(())
    }

    #[test]
    fn test_key_order() -> Result<()> {
        let geometry = geometry("v 1 2 3\nvt 4 5\nvn 6 7 8\nf 1/1/1\n");
        let resolved = Resolved::resolve(&geometry, &geometry.multi_indices[0])?;
        let scalars: Vec<f32> = resolved.key().scalars().collect();
        assert_eq!(scalars, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        Ok(())
    }

    // corners drawn from a small pool so that repeats are common
    fn pooled(corners: &[(u8, u8)]) -> Geometry {
        let positions = (0..4).map(|i| Vec3::new((i % 2) as f32, 0.0, 0.0)).collect();
        let normals = (0..3).map(|i| Vec3::new(0.0, 0.0, i as f32)).collect();
        let faces = corners
            .chunks(3)
            .map(|chunk| Face {
                indices: chunk
                    .iter()
                    .map(|&(p, n)| MultiIndex::PositionNormal(usize::from(p % 4) + 1, usize::from(n % 3) + 1))
                    .collect(),
            })
            .collect();
        Geometry::new(positions, Vec::new(), normals, faces)
    }

    #[quickcheck]
    fn prop_index_count(corners: Vec<(u8, u8)>) -> bool {
        let geometry = pooled(&corners);
        let mesh = reindex(&geometry).unwrap();
        mesh.indices.len() == geometry.multi_indices.len()
            && mesh.positions.len() == mesh.normals.len()
            && mesh.validate().is_ok()
    }

    #[quickcheck]
    fn prop_dense_first_seen(corners: Vec<(u8, u8)>) -> bool {
        let geometry = pooled(&corners);
        let mesh = reindex(&geometry).unwrap();

        // every index is either a repeat or exactly the next unused one
        let mut next = 0u16;
        for &index in &mesh.indices {
            if index == next {
                next += 1;
            } else if index > next {
                return false;
            }
        }

        let distinct: HashSet<CanonicalKey> = geometry
            .multi_indices
            .iter()
            .map(|m| Resolved::resolve(&geometry, m).unwrap().key())
            .collect();
        usize::from(next) == distinct.len() && mesh.positions.len() == distinct.len()
    }

    #[quickcheck]
    fn prop_value_identity(corners: Vec<(u8, u8)>) -> bool {
        let geometry = pooled(&corners);
        let mesh = reindex(&geometry).unwrap();

        geometry
            .multi_indices
            .iter()
            .zip(&mesh.indices)
            .all(|(multi_index, &index)| {
                let resolved = Resolved::resolve(&geometry, multi_index).unwrap();
                mesh.positions[usize::from(index)] == resolved.position
                    && Some(mesh.normals[usize::from(index)]) == resolved.normal
            })
    }

    #[quickcheck]
    fn prop_equal_keys_share_index(corners: Vec<(u8, u8)>) -> bool {
        let geometry = pooled(&corners);
        let mesh = reindex(&geometry).unwrap();

        // value-equal corners get one index, distinct values never share one
        let mut by_key: HashMap<CanonicalKey, u16> = HashMap::new();
        let mut by_index: HashMap<u16, CanonicalKey> = HashMap::new();
        geometry
            .multi_indices
            .iter()
            .zip(&mesh.indices)
            .all(|(multi_index, &index)| {
                let key = Resolved::resolve(&geometry, multi_index).unwrap().key();
                *by_key.entry(key.clone()).or_insert(index) == index
                    && *by_index.entry(index).or_insert(key.clone()) == key
            })
    }

    #[test]
    fn test_equal_keys_share_index() -> Result<()> {
        // positions 1 and 3 are equal by value, normals 1 and 2 differ
        let geometry = pooled(&[(0, 0), (2, 0), (0, 1), (2, 1), (1, 0), (3, 0)]);
        let mesh = reindex(&geometry)?;
        assert_eq!(mesh.indices, vec![0, 0, 1, 1, 2, 2]);
        Ok(())
    }
}
