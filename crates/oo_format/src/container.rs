//! Fixed layout of the `OoOo` container.
//!
//! ```text
//! offset  size  field
//! 0       4     magic "OoOo"
//! 4       4     size of one vec3 (position/normal)
//! 8       4     size of one vec2 (texture coordinate)
//! 12      4     size of one index
//! 16      4     position count
//! 20      4     texture coordinate count
//! 24      4     normal count
//! 28      4     index count
//! 32      ...   positions, texture coordinates, normals, indices
//! ```
//!
//! Every integer and float is little-endian.

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{FormatError, Result};
use crate::mesh::IndexedMesh;

pub const MAGIC: [u8; 4] = *b"OoOo";
pub const HEADER_LEN: usize = 32;

pub const VEC3_SIZE: u32 = 3 * 4;
pub const VEC2_SIZE: u32 = 2 * 4;
pub const INDEX_SIZE: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    pub vec3_size: u32,
    pub vec2_size: u32,
    pub index_size: u32,
    pub verts_count: u32,
    pub uvs_count: u32,
    pub normals_count: u32,
    pub indices_count: u32,
}

impl ContainerHeader {
    pub fn for_mesh(mesh: &IndexedMesh) -> Result<Self> {
        Ok(Self {
            vec3_size: VEC3_SIZE,
            vec2_size: VEC2_SIZE,
            index_size: INDEX_SIZE,
            verts_count: count("positions", mesh.positions.len())?,
            uvs_count: count("texture coordinates", mesh.texcoords.len())?,
            normals_count: count("normals", mesh.normals.len())?,
            indices_count: count("indices", mesh.indices.len())?,
        })
    }

    /// Number of bytes following the header.
    pub fn payload_len(&self) -> u64 {
        u64::from(self.verts_count) * u64::from(self.vec3_size)
            + u64::from(self.uvs_count) * u64::from(self.vec2_size)
            + u64::from(self.normals_count) * u64::from(self.vec3_size)
            + u64::from(self.indices_count) * u64::from(self.index_size)
    }

    /// Total container length, header included.
    pub fn container_len(&self) -> u64 {
        HEADER_LEN as u64 + self.payload_len()
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&MAGIC)?;
        for field in &[
            self.vec3_size,
            self.vec2_size,
            self.index_size,
            self.verts_count,
            self.uvs_count,
            self.normals_count,
            self.indices_count,
        ] {
            writer.write_u32::<LittleEndian>(*field)?;
        }
        Ok(())
    }

    /// Reads the header and rejects containers produced with other component widths.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut magic = [0u8; 4];
        reader
            .read_exact(&mut magic)
            .map_err(|err| map_eof(err, "magic"))?;
        if magic != MAGIC {
            return Err(FormatError::InvalidContainerFormat { found: magic });
        }

        let mut fields = [0u32; 7];
        reader
            .read_u32_into::<LittleEndian>(&mut fields)
            .map_err(|err| map_eof(err, "header"))?;

        let header = Self {
            vec3_size: fields[0],
            vec2_size: fields[1],
            index_size: fields[2],
            verts_count: fields[3],
            uvs_count: fields[4],
            normals_count: fields[5],
            indices_count: fields[6],
        };

        expect_size("vec3", VEC3_SIZE, header.vec3_size)?;
        expect_size("vec2", VEC2_SIZE, header.vec2_size)?;
        expect_size("index", INDEX_SIZE, header.index_size)?;

        Ok(header)
    }
}

fn count(component: &'static str, len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| FormatError::CountOverflow {
        component,
        count: len,
    })
}

fn expect_size(component: &'static str, expected: u32, found: u32) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(FormatError::ComponentSizeMismatch {
            component,
            expected,
            found,
        })
    }
}

pub(crate) fn map_eof(err: io::Error, section: &'static str) -> FormatError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        FormatError::UnexpectedEof { section }
    } else {
        FormatError::IoError(err)
    }
}
