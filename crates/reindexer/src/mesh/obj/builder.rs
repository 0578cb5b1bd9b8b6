use std::fmt;

use gfx_maths::{Vec2, Vec3};
use log::debug;

use super::parser::Record;

/// A face-vertex reference into the separate attribute arrays, as written in the file (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MultiIndex {
    /// `p`
    Position(usize),
    /// `p//n`
    PositionNormal(usize, usize),
    /// `p/t/n`
    PositionTexNormal(usize, usize, usize),
}

impl MultiIndex {
    pub fn arity(&self) -> usize {
        match self {
            MultiIndex::Position(_) => 1,
            MultiIndex::PositionNormal(..) => 2,
            MultiIndex::PositionTexNormal(..) => 3,
        }
    }

    pub fn position(&self) -> usize {
        match *self {
            MultiIndex::Position(p)
            | MultiIndex::PositionNormal(p, _)
            | MultiIndex::PositionTexNormal(p, _, _) => p,
        }
    }

    pub fn texcoord(&self) -> Option<usize> {
        match *self {
            MultiIndex::PositionTexNormal(_, t, _) => Some(t),
            _ => None,
        }
    }

    pub fn normal(&self) -> Option<usize> {
        match *self {
            MultiIndex::Position(_) => None,
            MultiIndex::PositionNormal(_, n) | MultiIndex::PositionTexNormal(_, _, n) => Some(n),
        }
    }
}

impl fmt::Display for MultiIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MultiIndex::Position(p) => write!(f, "{}", p),
            MultiIndex::PositionNormal(p, n) => write!(f, "{}//{}", p, n),
            MultiIndex::PositionTexNormal(p, t, n) => write!(f, "{}/{}/{}", p, t, n),
        }
    }
}

/// A polygon, one multi-index per corner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Face {
    pub indices: Vec<MultiIndex>,
}

/// Everything read from one file, before reindexing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    pub positions: Vec<Vec3>,
    pub texcoords: Vec<Vec2>,
    pub normals: Vec<Vec3>,
    pub faces: Vec<Face>,
    /// All face corners in face order; the traversal order of the reindexer.
    pub multi_indices: Vec<MultiIndex>,
}

impl Geometry {
    pub fn new(
        positions: Vec<Vec3>,
        texcoords: Vec<Vec2>,
        normals: Vec<Vec3>,
        faces: Vec<Face>,
    ) -> Self {
        let multi_indices = flatten(&faces);
        Geometry {
            positions,
            texcoords,
            normals,
            faces,
            multi_indices,
        }
    }
}

/// Concatenates the corners of all faces, keeping face order and corner order.
pub fn flatten(faces: &[Face]) -> Vec<MultiIndex> {
    faces
        .iter()
        .flat_map(|face| face.indices.iter().copied())
        .collect()
}

#[derive(Debug, Default)]
pub struct GeometryBuilder {
    positions: Vec<Vec3>,
    texcoords: Vec<Vec2>,
    normals: Vec<Vec3>,
    faces: Vec<Face>,
}

impl GeometryBuilder {
    pub fn push_position(&mut self, position: [f32; 3]) {
        self.positions.push(position.into());
    }

    pub fn push_uv(&mut self, uv: [f32; 2]) {
        self.texcoords.push(uv.into());
    }

    pub fn push_normal(&mut self, normal: [f32; 3]) {
        self.normals.push(normal.into());
    }

    pub fn push_face(&mut self, face: Face) {
        self.faces.push(face);
    }

    pub fn push_record(&mut self, record: Record) {
        match record {
            Record::Position(position) => self.push_position(position),
            Record::TexCoord(uv) => self.push_uv(uv),
            Record::Normal(normal) => self.push_normal(normal),
            Record::Face(face) => self.push_face(face),
        }
    }

    pub fn build(self) -> Geometry {
        let geometry = Geometry::new(self.positions, self.texcoords, self.normals, self.faces);
        debug!(
            "Built geometry: {} positions, {} uvs, {} normals, {} faces, {} face vertices",
            geometry.positions.len(),
            geometry.texcoords.len(),
            geometry.normals.len(),
            geometry.faces.len(),
            geometry.multi_indices.len()
        );
        geometry
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use quickcheck_macros::quickcheck;

    fn face(indices: &[MultiIndex]) -> Face {
        Face {
            indices: indices.to_vec(),
        }
    }

    #[test]
    fn test_flatten_order() {
        use MultiIndex::*;

        let faces = vec![
            face(&[PositionNormal(1, 1), PositionNormal(2, 1), PositionNormal(3, 1)]),
            face(&[PositionNormal(3, 1), PositionNormal(2, 1), PositionNormal(4, 1), PositionNormal(5, 2)]),
        ];

        assert_eq!(
            flatten(&faces),
            vec![
                PositionNormal(1, 1),
                PositionNormal(2, 1),
                PositionNormal(3, 1),
                PositionNormal(3, 1),
                PositionNormal(2, 1),
                PositionNormal(4, 1),
                PositionNormal(5, 2),
            ]
        );
    }

    #[quickcheck]
    fn prop_flatten_length(corners: Vec<Vec<u8>>) -> bool {
        let faces: Vec<Face> = corners
            .iter()
            .map(|f| Face {
                indices: f.iter().map(|&p| MultiIndex::Position(usize::from(p) + 1)).collect(),
            })
            .collect();

        flatten(&faces).len() == faces.iter().map(|f| f.indices.len()).sum::<usize>()
    }

    #[test]
    fn test_multi_index_accessors() {
        let index = MultiIndex::PositionTexNormal(4, 5, 6);
        assert_eq!(index.arity(), 3);
        assert_eq!(index.position(), 4);
        assert_eq!(index.texcoord(), Some(5));
        assert_eq!(index.normal(), Some(6));

        let index = MultiIndex::PositionNormal(4, 6);
        assert_eq!(index.arity(), 2);
        assert_eq!(index.texcoord(), None);
        assert_eq!(index.normal(), Some(6));

        assert_eq!(MultiIndex::Position(7).normal(), None);
    }

    #[test]
    fn test_multi_index_display() {
        assert_eq!(MultiIndex::Position(1).to_string(), "1");
        assert_eq!(MultiIndex::PositionNormal(1, 2).to_string(), "1//2");
        assert_eq!(MultiIndex::PositionTexNormal(1, 2, 3).to_string(), "1/2/3");
    }

    #[test]
    fn test_builder() {
        let mut builder = GeometryBuilder::default();
        builder.push_position([1.0, 2.0, 3.0]);
        builder.push_normal([0.0, 0.0, 1.0]);
        builder.push_uv([0.5, 0.5]);
        builder.push_face(face(&[MultiIndex::PositionTexNormal(1, 1, 1)]));

        let geometry = builder.build();
        assert_eq!(geometry.positions, vec![Vec3::new(1.0, 2.0, 3.0)]);
        assert_eq!(geometry.normals, vec![Vec3::new(0.0, 0.0, 1.0)]);
        assert_eq!(geometry.texcoords, vec![Vec2::new(0.5, 0.5)]);
        assert_eq!(geometry.multi_indices, vec![MultiIndex::PositionTexNormal(1, 1, 1)]);
    }
}
