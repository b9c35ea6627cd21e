//! Lyon-based vector/polygon rendering system.
//!
//! CPU-side tessellation of filled and stroked screen-space shapes into a flat
//! triangle-list vertex buffer. Geometry is split into two passes around the
//! SDF bodies: `Back` is drawn before them, `Front` after. `finish()` lays the
//! front pass after the back pass so the host draws `[0, split)` then
//! `[split, vertex_count)`.
//!
//! # Usage
//!
//! ```ignore
//! // In your Game::render():
//! ctx.vectors.set_pass(VectorPass::Back);
//! ctx.vectors.stroke_polyline(&orbit_points, 1.0, VectorColor::rgb8(0, 128, 255).with_alpha(0.6));
//! ctx.vectors.set_pass(VectorPass::Front);
//! ctx.vectors.fill_polygon(&near_ring_half, ring_color);
//! ```

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use lyon::math::point;
use lyon::path::Path;
use lyon::tessellation::{
    BuffersBuilder, FillOptions, FillTessellator, FillVertex, FillVertexConstructor,
    StrokeOptions, StrokeTessellator, StrokeVertex, StrokeVertexConstructor, VertexBuffers,
};

/// Per-vertex data for vector/polygon rendering.
/// 6 floats = 24 bytes per vertex.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct VectorVertex {
    pub x: f32,
    pub y: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl VectorVertex {
    /// Number of floats per vertex.
    pub const FLOATS: usize = 6;
    /// Stride in bytes.
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4; // 24
}

/// RGBA color for vector drawing operations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl VectorColor {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Fully opaque color from RGB components.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Opaque color from a packed 0xRRGGBB value.
    pub fn hex(rgb: u32) -> Self {
        Self::rgb8((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    /// Opaque color from RGB u8 values (0-255).
    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: 1.0,
        }
    }

    /// Opaque color from hue, saturation, lightness, all in [0, 1].
    pub fn hsl(h: f32, s: f32, l: f32) -> Self {
        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let hp = h.rem_euclid(1.0) * 6.0;
        let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
        let (r, g, b) = match hp as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = l - c / 2.0;
        Self::rgb(r + m, g + m, b + m)
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);
}

impl Default for VectorColor {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Which side of the SDF bodies new geometry is drawn on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VectorPass {
    #[default]
    Back,
    Front,
}

struct FillVertexCtor {
    color: VectorColor,
}

impl FillVertexConstructor<VectorVertex> for FillVertexCtor {
    fn new_vertex(&mut self, vertex: FillVertex) -> VectorVertex {
        VectorVertex {
            x: vertex.position().x,
            y: vertex.position().y,
            r: self.color.r,
            g: self.color.g,
            b: self.color.b,
            a: self.color.a,
        }
    }
}

struct StrokeVertexCtor {
    color: VectorColor,
}

impl StrokeVertexConstructor<VectorVertex> for StrokeVertexCtor {
    fn new_vertex(&mut self, vertex: StrokeVertex) -> VectorVertex {
        VectorVertex {
            x: vertex.position().x,
            y: vertex.position().y,
            r: self.color.r,
            g: self.color.g,
            b: self.color.b,
            a: self.color.a,
        }
    }
}

/// State for vector/polygon rendering.
///
/// Holds lyon tessellators and the two pass buffers.
/// Cleared each frame and populated by drawing commands.
pub struct VectorState {
    fill_tess: FillTessellator,
    stroke_tess: StrokeTessellator,
    geometry: VertexBuffers<VectorVertex, u32>,
    /// Back pass while drawing; back + front after `finish()`.
    buffer: Vec<f32>,
    front: Vec<f32>,
    pass: VectorPass,
    split: usize,
    max_vertices: usize,
    dropped: usize,
}

impl VectorState {
    pub fn new() -> Self {
        Self::with_capacity(65536)
    }

    /// Create a VectorState that holds at most `max_vertices` across both passes.
    pub fn with_capacity(max_vertices: usize) -> Self {
        Self {
            fill_tess: FillTessellator::new(),
            stroke_tess: StrokeTessellator::new(),
            geometry: VertexBuffers::new(),
            buffer: Vec::with_capacity(max_vertices * VectorVertex::FLOATS),
            front: Vec::new(),
            pass: VectorPass::Back,
            split: 0,
            max_vertices,
            dropped: 0,
        }
    }

    /// Clear both passes and return to the back pass. Called at the start of each frame.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.front.clear();
        self.pass = VectorPass::Back;
        self.split = 0;
        self.dropped = 0;
    }

    pub fn set_pass(&mut self, pass: VectorPass) {
        self.pass = pass;
    }

    pub fn pass(&self) -> VectorPass {
        self.pass
    }

    /// Append the front pass after the back pass and record the split.
    pub fn finish(&mut self) {
        self.split = self.buffer.len() / VectorVertex::FLOATS;
        self.buffer.append(&mut self.front);
        if self.dropped > 0 {
            log::debug!("vectors: dropped {} vertices over capacity", self.dropped);
        }
    }

    /// Vertices in both passes.
    pub fn vertex_count(&self) -> usize {
        (self.buffer.len() + self.front.len()) / VectorVertex::FLOATS
    }

    /// Vertices drawn before the SDF bodies (valid after `finish()`).
    pub fn split(&self) -> usize {
        self.split
    }

    pub fn max_vertices(&self) -> usize {
        self.max_vertices
    }

    /// Raw pointer to the flat float buffer (for SAB copy).
    pub fn buffer_ptr(&self) -> *const f32 {
        self.buffer.as_ptr()
    }

    fn target(&mut self) -> &mut Vec<f32> {
        match self.pass {
            VectorPass::Back => &mut self.buffer,
            VectorPass::Front => &mut self.front,
        }
    }

    /// Whether `count` more vertices fit; counts the overflow otherwise.
    fn reserve(&mut self, count: usize) -> bool {
        if self.vertex_count() + count > self.max_vertices {
            self.dropped += count;
            return false;
        }
        true
    }

    /// Flush indexed geometry to the current pass as a triangle list.
    fn flush_geometry(&mut self) {
        let count = self.geometry.indices.len();
        if self.reserve(count) {
            let out = match self.pass {
                VectorPass::Back => &mut self.buffer,
                VectorPass::Front => &mut self.front,
            };
            for idx in &self.geometry.indices {
                let v = &self.geometry.vertices[*idx as usize];
                out.extend_from_slice(&[v.x, v.y, v.r, v.g, v.b, v.a]);
            }
        }
        self.geometry.vertices.clear();
        self.geometry.indices.clear();
    }

    /// Axis-aligned square centred on `center`, written directly without tessellation.
    /// Used for point sprites such as stars.
    pub fn fill_square(&mut self, center: Vec2, size: f32, color: VectorColor) {
        if size <= 0.0 || !self.reserve(6) {
            return;
        }
        let h = size * 0.5;
        let (x0, y0, x1, y1) = (center.x - h, center.y - h, center.x + h, center.y + h);
        let VectorColor { r, g, b, a } = color;
        self.target().extend_from_slice(&[
            x0, y0, r, g, b, a,
            x1, y0, r, g, b, a,
            x1, y1, r, g, b, a,
            x0, y0, r, g, b, a,
            x1, y1, r, g, b, a,
            x0, y1, r, g, b, a,
        ]);
    }

    /// Tessellate and fill a polygon.
    ///
    /// The polygon is closed automatically. Supports convex and concave shapes.
    pub fn fill_polygon(&mut self, points: &[Vec2], color: VectorColor) {
        if points.len() < 3 {
            return;
        }
        let path = polyline_path(points, true);
        self.fill_path(&path, color);
    }

    /// Tessellate and fill an arbitrary lyon Path (even-odd rule).
    pub fn fill_path(&mut self, path: &Path, color: VectorColor) {
        let result = self.fill_tess.tessellate_path(
            path,
            &FillOptions::tolerance(0.5).with_fill_rule(lyon::tessellation::FillRule::EvenOdd),
            &mut BuffersBuilder::new(&mut self.geometry, FillVertexCtor { color }),
        );

        match result {
            Ok(()) => self.flush_geometry(),
            Err(e) => {
                log::debug!("vectors: fill failed: {:?}", e);
                self.geometry.vertices.clear();
                self.geometry.indices.clear();
            }
        }
    }

    /// Tessellate a stroked polyline (open path).
    pub fn stroke_polyline(&mut self, points: &[Vec2], width: f32, color: VectorColor) {
        if points.len() < 2 {
            return;
        }
        let path = polyline_path(points, false);
        self.stroke_path(&path, width, color);
    }

    /// Tessellate a stroked closed polygon.
    pub fn stroke_polygon(&mut self, points: &[Vec2], width: f32, color: VectorColor) {
        if points.len() < 3 {
            return;
        }
        let path = polyline_path(points, true);
        self.stroke_path(&path, width, color);
    }

    /// Tessellate an arbitrary stroked lyon Path.
    pub fn stroke_path(&mut self, path: &Path, width: f32, color: VectorColor) {
        let result = self.stroke_tess.tessellate_path(
            path,
            &StrokeOptions::tolerance(0.5).with_line_width(width),
            &mut BuffersBuilder::new(&mut self.geometry, StrokeVertexCtor { color }),
        );

        match result {
            Ok(()) => self.flush_geometry(),
            Err(e) => {
                log::debug!("vectors: stroke failed: {:?}", e);
                self.geometry.vertices.clear();
                self.geometry.indices.clear();
            }
        }
    }
}

impl Default for VectorState {
    fn default() -> Self {
        Self::new()
    }
}

fn polyline_path(points: &[Vec2], closed: bool) -> Path {
    let mut builder = Path::builder();
    builder.begin(point(points[0].x, points[0].y));
    for p in &points[1..] {
        builder.line_to(point(p.x, p.y));
    }
    builder.end(closed);
    builder.build()
}
