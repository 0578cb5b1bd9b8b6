use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use gfx_maths::{Vec2, Vec3};

use crate::container::{map_eof, ContainerHeader, HEADER_LEN};
use crate::error::{FormatError, Result};

// upper bound for allocations driven by untrusted header counts
const PREALLOCATE_LIMIT: usize = 1 << 16;

/// Single-indexed mesh: three attribute arrays addressed by one shared index array.
///
/// `texcoords` and `normals` are either empty or grow in lock-step with `positions`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexedMesh {
    pub positions: Vec<Vec3>,
    pub texcoords: Vec<Vec2>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u16>,
}

impl IndexedMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Checks the invariants a renderer relies on before uploading the buffers.
    pub fn validate(&self) -> Result<()> {
        let vertex_count = self.vertex_count();
        for (component, found) in &[
            ("texture coordinates", self.texcoords.len()),
            ("normals", self.normals.len()),
        ] {
            if *found != 0 && *found != vertex_count {
                return Err(FormatError::AttributeMismatch {
                    component: *component,
                    expected: vertex_count,
                    found: *found,
                });
            }
        }

        if let Some(&index) = self
            .indices
            .iter()
            .find(|&&index| usize::from(index) >= vertex_count)
        {
            return Err(FormatError::IndexOutOfBounds {
                index,
                vertex_count,
            });
        }

        Ok(())
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = bytes;
        let header = match ContainerHeader::read(&mut reader) {
            Err(FormatError::UnexpectedEof { .. }) => {
                return Err(FormatError::Truncated {
                    expected: HEADER_LEN as u64,
                    found: bytes.len() as u64,
                })
            }
            header => header?,
        };

        let expected = header.container_len();
        let found = bytes.len() as u64;
        if found < expected {
            return Err(FormatError::Truncated { expected, found });
        }
        if found > expected {
            return Err(FormatError::TrailingBytes { expected, found });
        }

        Self::read_payload(&header, &mut reader)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read(path)?;
        IndexedMesh::from_bytes(&data)
    }

    /// Reads one container from a stream, leaving anything after it unread.
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let header = ContainerHeader::read(&mut reader)?;
        Self::read_payload(&header, &mut reader)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let header = ContainerHeader::for_mesh(self)?;
        let mut bytes = Vec::with_capacity(header.container_len() as usize);
        self.write_with(&header, &mut bytes)?;
        Ok(bytes)
    }

    pub fn to_file(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        let header = ContainerHeader::for_mesh(self)?;
        self.write_with(&header, &mut writer)?;
        Ok(())
    }

    fn write_with<W: Write>(&self, header: &ContainerHeader, writer: &mut W) -> io::Result<()> {
        header.write(writer)?;
        for position in &self.positions {
            write_vec3(writer, position)?;
        }
        for uv in &self.texcoords {
            writer.write_f32::<LittleEndian>(uv.x)?;
            writer.write_f32::<LittleEndian>(uv.y)?;
        }
        for normal in &self.normals {
            write_vec3(writer, normal)?;
        }
        for index in &self.indices {
            writer.write_u16::<LittleEndian>(*index)?;
        }
        writer.flush()
    }

    fn read_payload<R: Read>(header: &ContainerHeader, reader: &mut R) -> Result<Self> {
        Ok(IndexedMesh {
            positions: read_array(reader, header.verts_count, "positions", read_vec3)?,
            texcoords: read_array(reader, header.uvs_count, "texture coordinates", read_vec2)?,
            normals: read_array(reader, header.normals_count, "normals", read_vec3)?,
            indices: read_array(reader, header.indices_count, "indices", |r| {
                r.read_u16::<LittleEndian>()
            })?,
        })
    }
}

fn write_vec3<W: Write>(writer: &mut W, v: &Vec3) -> io::Result<()> {
    writer.write_f32::<LittleEndian>(v.x)?;
    writer.write_f32::<LittleEndian>(v.y)?;
    writer.write_f32::<LittleEndian>(v.z)
}

fn read_vec3<R: Read>(reader: &mut R) -> io::Result<Vec3> {
    Ok(Vec3::new(
        reader.read_f32::<LittleEndian>()?,
        reader.read_f32::<LittleEndian>()?,
        reader.read_f32::<LittleEndian>()?,
    ))
}

fn read_vec2<R: Read>(reader: &mut R) -> io::Result<Vec2> {
    Ok(Vec2::new(
        reader.read_f32::<LittleEndian>()?,
        reader.read_f32::<LittleEndian>()?,
    ))
}

fn read_array<R, T, F>(reader: &mut R, count: u32, section: &'static str, read: F) -> Result<Vec<T>>
where
    R: Read,
    F: Fn(&mut R) -> io::Result<T>,
{
    let count = count as usize;
    let mut items = Vec::with_capacity(count.min(PREALLOCATE_LIMIT));
    for _ in 0..count {
        items.push(read(reader).map_err(|err| map_eof(err, section))?);
    }
    Ok(items)
}
