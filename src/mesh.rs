//! Tessellation output handed to rasterizers.

use bytemuck::{Pod, Zeroable};
use lyon::math::Point;
use lyon::tessellation::VertexBuffers;

use crate::{FillStyleId, LineStyleId};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 2],
}

impl MeshVertex {
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { position: [x, y] }
    }
}

impl From<Point> for MeshVertex {
    fn from(point: Point) -> Self {
        Self {
            position: point.to_array(),
        }
    }
}

/// Triangle list: every three indices form one triangle.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Vertex data as raw bytes, ready to upload to a vertex buffer.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Iterates triangles as vertex triples. Out of range indices are skipped.
    pub fn triangles(&self) -> impl Iterator<Item = [MeshVertex; 3]> + '_ {
        self.indices.chunks_exact(3).filter_map(|triangle| {
            Some([
                *self.vertices.get(triangle[0] as usize)?,
                *self.vertices.get(triangle[1] as usize)?,
                *self.vertices.get(triangle[2] as usize)?,
            ])
        })
    }

    /// Sum of triangle areas.
    pub fn area(&self) -> f32 {
        self.triangles()
            .map(|[a, b, c]| {
                let [ax, ay] = a.position;
                let [bx, by] = b.position;
                let [cx, cy] = c.position;
                ((bx - ax) * (cy - ay) - (cx - ax) * (by - ay)).abs() * 0.5
            })
            .sum()
    }
}

impl From<VertexBuffers<MeshVertex, u32>> for Mesh {
    fn from(buffers: VertexBuffers<MeshVertex, u32>) -> Self {
        Self {
            vertices: buffers.vertices,
            indices: buffers.indices,
        }
    }
}

/// Triangulated region painted with one fill style.
#[derive(Debug, Clone, PartialEq)]
pub struct FillMesh {
    pub style: FillStyleId,
    pub mesh: Mesh,
}

/// A flattened stroked path.
///
/// `points` is the polyline as flattened; a closed strip does not repeat its first
/// point. `mesh` holds the stroke triangles for `style`'s width and is empty for
/// hairlines.
#[derive(Debug, Clone, PartialEq)]
pub struct LineStrip {
    pub style: LineStyleId,
    pub points: Vec<Point>,
    pub closed: bool,
    pub mesh: Mesh,
}

impl LineStrip {
    /// Polyline segments, including the closing one for closed strips.
    pub fn segments(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let closing = match (self.closed, self.points.first(), self.points.last()) {
            (true, Some(first), Some(last)) if self.points.len() > 2 => Some((*last, *first)),
            _ => None,
        };
        self.points
            .windows(2)
            .map(|pair| (pair[0], pair[1]))
            .chain(closing)
    }
}

/// Everything a rasterizer needs to draw one shape at a given tolerance.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshSet {
    pub tolerance: f32,
    /// Ordered by fill style id.
    pub fills: Vec<FillMesh>,
    /// In paint order.
    pub strips: Vec<LineStrip>,
}

impl MeshSet {
    pub fn empty(tolerance: f32) -> Self {
        Self {
            tolerance,
            fills: Vec::new(),
            strips: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fills.is_empty() && self.strips.is_empty()
    }

    pub fn fill_mesh(&self, style: FillStyleId) -> Option<&Mesh> {
        self.fills
            .iter()
            .find(|fill| fill.style == style)
            .map(|fill| &fill.mesh)
    }

    pub fn vertex_count(&self) -> usize {
        self.fills
            .iter()
            .map(|fill| fill.mesh.vertices.len())
            .chain(self.strips.iter().map(|strip| strip.mesh.vertices.len()))
            .sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.fills
            .iter()
            .map(|fill| fill.mesh.triangle_count())
            .chain(self.strips.iter().map(|strip| strip.mesh.triangle_count()))
            .sum()
    }
}
