//! Human readable listing of a conversion, in the notation of the input format.

use std::io::{self, Write};

use oo_format::IndexedMesh;

use crate::mesh::obj::Geometry;

pub fn write_geometry<W: Write>(writer: &mut W, geometry: &Geometry) -> io::Result<()> {
    writeln!(writer, "# geometry")?;
    for p in &geometry.positions {
        writeln!(writer, "v {:.6} {:.6} {:.6}", p.x, p.y, p.z)?;
    }
    for n in &geometry.normals {
        writeln!(writer, "vn {:.6} {:.6} {:.6}", n.x, n.y, n.z)?;
    }
    for uv in &geometry.texcoords {
        writeln!(writer, "vt {:.6} {:.6}", uv.x, uv.y)?;
    }
    for face in &geometry.faces {
        write!(writer, "f")?;
        for index in &face.indices {
            write!(writer, " {}", index)?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

pub fn write_mesh<W: Write>(writer: &mut W, mesh: &IndexedMesh) -> io::Result<()> {
    writeln!(writer, "# indexed")?;
    for p in &mesh.positions {
        writeln!(writer, "v {:.6} {:.6} {:.6}", p.x, p.y, p.z)?;
    }
    for uv in &mesh.texcoords {
        writeln!(writer, "vt {:.6} {:.6}", uv.x, uv.y)?;
    }
    for n in &mesh.normals {
        writeln!(writer, "vn {:.6} {:.6} {:.6}", n.x, n.y, n.z)?;
    }
    write!(writer, "i")?;
    for index in &mesh.indices {
        write!(writer, " {}", index)?;
    }
    writeln!(writer)
}

pub fn write_dump<W: Write>(writer: &mut W, geometry: &Geometry, mesh: &IndexedMesh) -> io::Result<()> {
    write_geometry(writer, geometry)?;
    write_mesh(writer, mesh)
}
