//! Lazily filled mesh cache and its persistent binary form.
//!
//! The stream layout is little-endian:
//!
//! ```text
//! magic "SMSH" | version: u16 | mesh set count: u32 | mesh sets...
//! mesh set  = tolerance: f32 | fill count: u32 | (fill id: u32, mesh)...
//!             | strip count: u32 | (line id: u32, closed: u8, point count: u32,
//!               (x: f32, y: f32)..., mesh)...
//! mesh      = vertex count: u32 | (x: f32, y: f32)... | index count: u32 | index: u32...
//! ```

use std::io::{Read, Write};

use lyon::math::{point, Point};
use tracing::{debug, trace, warn};

use crate::error::{Result, ShapeError};
use crate::mesh::{FillMesh, LineStrip, Mesh, MeshSet, MeshVertex};
use crate::style::StyleRegistry;
use crate::tessellator::TessellationOptions;
use crate::{FillStyleId, LineStyleId};

const MAGIC: [u8; 4] = *b"SMSH";
pub const CACHE_FORMAT_VERSION: u16 = 1;

/// Cap on speculative allocation while decoding; real counts may exceed it.
const PREALLOCATION_LIMIT: usize = 4096;

/// Controls what [`ShapeDef::output_cached_data`](crate::ShapeDef::output_cached_data)
/// writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheOptions {
    /// When `false`, line strips are written with empty stroke meshes and the
    /// rasterizer strokes the polylines itself.
    pub include_stroke_meshes: bool,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            include_stroke_meshes: true,
        }
    }
}

struct CacheEntry {
    generation: u64,
    options: TessellationOptions,
    meshes: MeshSet,
}

impl CacheEntry {
    fn is_fresh(&self, tolerance: f32, options: &TessellationOptions, generation: u64) -> bool {
        self.generation == generation
            && self.options == *options
            && self.meshes.tolerance.to_bits() == tolerance.to_bits()
    }
}

/// Holds the mesh set of the last tessellation together with the shape generation
/// it was computed from.
#[derive(Default)]
pub(crate) struct MeshCache {
    entry: Option<CacheEntry>,
}

impl MeshCache {
    pub(crate) fn invalidate(&mut self) {
        self.entry = None;
    }

    pub(crate) fn is_fresh_for(&self, generation: u64) -> bool {
        self.entry
            .as_ref()
            .is_some_and(|entry| entry.generation == generation)
    }

    pub(crate) fn mesh_set(&self) -> Option<&MeshSet> {
        self.entry.as_ref().map(|entry| &entry.meshes)
    }

    /// Returns the cached meshes when they match, otherwise stores the result of
    /// `tessellate`. A failed `tessellate` keeps the previous entry.
    pub(crate) fn get_or_try_insert_with<F>(
        &mut self,
        tolerance: f32,
        options: &TessellationOptions,
        generation: u64,
        tessellate: F,
    ) -> Result<&MeshSet>
    where
        F: FnOnce() -> Result<MeshSet>,
    {
        let entry = match self.entry.take() {
            Some(entry) if entry.is_fresh(tolerance, options, generation) => {
                trace!("Mesh cache hit at tolerance {}", tolerance);
                entry
            }
            previous => {
                trace!("Mesh cache miss at tolerance {}", tolerance);
                match tessellate() {
                    Ok(meshes) => CacheEntry {
                        generation,
                        options: *options,
                        meshes,
                    },
                    Err(error) => {
                        self.entry = previous;
                        return Err(error);
                    }
                }
            }
        };
        Ok(&self.entry.insert(entry).meshes)
    }

    pub(crate) fn store(&mut self, meshes: MeshSet, options: TessellationOptions, generation: u64) {
        self.entry = Some(CacheEntry {
            generation,
            options,
            meshes,
        });
    }
}

fn write_u8(out: &mut impl Write, value: u8) -> Result<()> {
    out.write_all(&[value])?;
    Ok(())
}

fn write_u16(out: &mut impl Write, value: u16) -> Result<()> {
    out.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn write_u32(out: &mut impl Write, value: u32) -> Result<()> {
    out.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn write_f32(out: &mut impl Write, value: f32) -> Result<()> {
    out.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn write_len(out: &mut impl Write, len: usize) -> Result<()> {
    let len = u32::try_from(len)
        .map_err(|_| ShapeError::CorruptCache(format!("count {len} exceeds the u32 range")))?;
    write_u32(out, len)
}

fn write_point(out: &mut impl Write, [x, y]: [f32; 2]) -> Result<()> {
    write_f32(out, x)?;
    write_f32(out, y)
}

fn write_mesh(out: &mut impl Write, mesh: &Mesh) -> Result<()> {
    write_len(out, mesh.vertices.len())?;
    for vertex in &mesh.vertices {
        write_point(out, vertex.position)?;
    }
    write_len(out, mesh.indices.len())?;
    for index in &mesh.indices {
        write_u32(out, *index)?;
    }
    Ok(())
}

fn write_mesh_set(out: &mut impl Write, meshes: &MeshSet, options: &CacheOptions) -> Result<()> {
    write_f32(out, meshes.tolerance)?;

    write_len(out, meshes.fills.len())?;
    for fill in &meshes.fills {
        write_u32(out, FillStyleId::to_wire(Some(fill.style))?)?;
        write_mesh(out, &fill.mesh)?;
    }

    write_len(out, meshes.strips.len())?;
    let empty = Mesh::new();
    for strip in &meshes.strips {
        write_u32(out, LineStyleId::to_wire(Some(strip.style))?)?;
        write_u8(out, strip.closed as u8)?;
        write_len(out, strip.points.len())?;
        for point in &strip.points {
            write_point(out, point.to_array())?;
        }
        let mesh = if options.include_stroke_meshes {
            &strip.mesh
        } else {
            &empty
        };
        write_mesh(out, mesh)?;
    }
    Ok(())
}

/// Writes `mesh_sets` to `out`. A failed write leaves `out` holding an unusable
/// prefix that must be discarded.
pub fn write_mesh_sets<'a>(
    out: &mut impl Write,
    mesh_sets: impl ExactSizeIterator<Item = &'a MeshSet>,
    options: &CacheOptions,
) -> Result<()> {
    out.write_all(&MAGIC)?;
    write_u16(out, CACHE_FORMAT_VERSION)?;
    write_len(out, mesh_sets.len())?;
    for meshes in mesh_sets {
        write_mesh_set(out, meshes, options)?;
    }
    out.flush()?;
    Ok(())
}

fn read_array<const N: usize>(input: &mut impl Read) -> Result<[u8; N]> {
    let mut bytes = [0u8; N];
    input.read_exact(&mut bytes)?;
    Ok(bytes)
}

fn read_u8(input: &mut impl Read) -> Result<u8> {
    Ok(read_array::<1>(input)?[0])
}

fn read_u16(input: &mut impl Read) -> Result<u16> {
    Ok(u16::from_le_bytes(read_array(input)?))
}

fn read_u32(input: &mut impl Read) -> Result<u32> {
    Ok(u32::from_le_bytes(read_array(input)?))
}

fn read_f32(input: &mut impl Read) -> Result<f32> {
    Ok(f32::from_le_bytes(read_array(input)?))
}

fn read_len(input: &mut impl Read) -> Result<usize> {
    Ok(read_u32(input)? as usize)
}

fn read_point(input: &mut impl Read) -> Result<Point> {
    let x = read_f32(input)?;
    let y = read_f32(input)?;
    Ok(point(x, y))
}

fn read_mesh(input: &mut impl Read) -> Result<Mesh> {
    let vertex_count = read_len(input)?;
    let mut vertices = Vec::with_capacity(vertex_count.min(PREALLOCATION_LIMIT));
    for _ in 0..vertex_count {
        vertices.push(MeshVertex::from(read_point(input)?));
    }

    let index_count = read_len(input)?;
    if index_count % 3 != 0 {
        return Err(ShapeError::CorruptCache(format!(
            "index count {index_count} is not a multiple of 3"
        )));
    }
    let mut indices = Vec::with_capacity(index_count.min(PREALLOCATION_LIMIT));
    for _ in 0..index_count {
        let index = read_u32(input)?;
        if index as usize >= vertex_count {
            return Err(ShapeError::CorruptCache(format!(
                "index {index} out of range for {vertex_count} vertices"
            )));
        }
        indices.push(index);
    }
    Ok(Mesh { vertices, indices })
}

fn read_mesh_set(input: &mut impl Read) -> Result<MeshSet> {
    let tolerance = read_f32(input)?;
    if !(tolerance.is_finite() && tolerance > 0.0) {
        return Err(ShapeError::CorruptCache(format!(
            "invalid tolerance {tolerance}"
        )));
    }

    let fill_count = read_len(input)?;
    let mut fills = Vec::with_capacity(fill_count.min(PREALLOCATION_LIMIT));
    for _ in 0..fill_count {
        let style = FillStyleId::from_wire(read_u32(input)?)
            .ok_or_else(|| ShapeError::CorruptCache("fill mesh without fill style".into()))?;
        let mesh = read_mesh(input)?;
        fills.push(FillMesh { style, mesh });
    }

    let strip_count = read_len(input)?;
    let mut strips = Vec::with_capacity(strip_count.min(PREALLOCATION_LIMIT));
    for _ in 0..strip_count {
        let style = LineStyleId::from_wire(read_u32(input)?)
            .ok_or_else(|| ShapeError::CorruptCache("line strip without line style".into()))?;
        let closed = match read_u8(input)? {
            0 => false,
            1 => true,
            other => {
                return Err(ShapeError::CorruptCache(format!(
                    "invalid closed flag {other}"
                )))
            }
        };
        let point_count = read_len(input)?;
        let mut points = Vec::with_capacity(point_count.min(PREALLOCATION_LIMIT));
        for _ in 0..point_count {
            points.push(read_point(input)?);
        }
        let mesh = read_mesh(input)?;
        strips.push(LineStrip {
            style,
            points,
            closed,
            mesh,
        });
    }

    Ok(MeshSet {
        tolerance,
        fills,
        strips,
    })
}

/// Checks the style ids of decoded meshes against `styles`. Errors report the
/// position of the offending fill mesh or line strip as `path`.
pub(crate) fn validate_mesh_style_refs(meshes: &MeshSet, styles: &StyleRegistry) -> Result<()> {
    for (position, fill) in meshes.fills.iter().enumerate() {
        if !styles.contains_fill(fill.style) {
            return Err(ShapeError::FillStyleOutOfRange {
                path: position,
                index: fill.style.get(),
                len: styles.fill_styles().len(),
            });
        }
    }
    for (position, strip) in meshes.strips.iter().enumerate() {
        if !styles.contains_line(strip.style) {
            return Err(ShapeError::LineStyleOutOfRange {
                path: position,
                index: strip.style.get(),
                len: styles.line_styles().len(),
            });
        }
    }
    Ok(())
}

/// Reads every mesh set from `input`.
pub fn read_mesh_sets(input: &mut impl Read) -> Result<Vec<MeshSet>> {
    let magic: [u8; 4] = read_array(input)?;
    if magic != MAGIC {
        warn!("Rejecting cache stream with magic {:?}", magic);
        return Err(ShapeError::CorruptCache("bad magic".into()));
    }
    let version = read_u16(input)?;
    if version != CACHE_FORMAT_VERSION {
        warn!("Rejecting cache stream with format version {}", version);
        return Err(ShapeError::UnsupportedCacheVersion(version));
    }
    let count = read_len(input)?;
    let mut mesh_sets = Vec::with_capacity(count.min(PREALLOCATION_LIMIT));
    for _ in 0..count {
        mesh_sets.push(read_mesh_set(input)?);
    }
    debug!("Decoded {} cached mesh set(s)", mesh_sets.len());
    Ok(mesh_sets)
}
