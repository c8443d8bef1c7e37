//! The fixed-function configuration surface consulted by the device.

/// How the index stream is grouped into primitives.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveMode {
    /// One point per index.
    Points,
    /// Consecutive index pairs.
    Lines,
    /// A connected run of line segments.
    LineStrip,
    /// A strip closed back onto its first vertex.
    LineLoop,
    /// Consecutive index triples.
    Triangles,
    /// A strip sharing an edge between consecutive triangles.
    TriangleStrip,
    /// Triangles sharing the first index.
    TriangleFan,
    /// Four indices per quad, split into two triangles.
    Quads,
}

/// How assembled triangles are turned into fragments.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PolygonMode {
    /// Rasterize only the vertices, as points.
    Point,
    /// Rasterize only the edges, as lines.
    Wireframe,
    /// Fill the interior.
    Fill,
}

/// Shape rasterized for each point primitive.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PointStyle {
    Rect,
    Circle,
}

/// Which triangle faces are discarded before rasterization.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CullMode {
    None,
    Front,
    Back,
}

/// Vertex winding that defines a front-facing triangle, as seen on
/// screen.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Winding {
    Ccw,
    Cw,
}

impl Winding {
    pub fn flipped(self) -> Self {
        match self {
            Winding::Ccw => Winding::Cw,
            Winding::Cw => Winding::Ccw,
        }
    }
}

/// The screen-space rectangle the NDC cube maps onto.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Viewport {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }
}

/// Configuration read by [`RenderDevice::draw`](crate::pipeline::RenderDevice::draw).
///
/// The two mask flags keep the convention of the device they model:
/// **`false` means writes are enabled**.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderStates {
    pub primitive_mode: PrimitiveMode,
    pub polygon_mode: PolygonMode,
    /// Target rectangle; a zero `w` adopts the framebuffer size at draw
    /// time.
    pub viewport: Viewport,
    /// Side length (or diameter) of rasterized points, in pixels.
    pub point_size: f32,
    pub point_style: PointStyle,
    /// `false` = colour writes enabled.
    pub color_mask: bool,
    pub depth_test: bool,
    pub alpha_test: bool,
    /// Fragments with alpha below this are dropped when `alpha_test` is
    /// on.
    pub alpha_test_threshold: f32,
    /// Run the depth test before the fragment shader. Requires
    /// `depth_test` and a depth plane.
    pub early_z_test: bool,
    /// `false` = depth writes enabled.
    pub depth_mask: bool,
    pub cull_mode: CullMode,
    pub front_winding: Winding,
}

impl Default for RenderStates {
    fn default() -> Self {
        Self {
            primitive_mode: PrimitiveMode::Triangles,
            polygon_mode: PolygonMode::Fill,
            viewport: Viewport::default(),
            point_size: 1.0,
            point_style: PointStyle::Rect,
            color_mask: false,
            depth_test: false,
            alpha_test: true,
            alpha_test_threshold: 0.5,
            early_z_test: false,
            depth_mask: false,
            cull_mode: CullMode::None,
            front_winding: Winding::Ccw,
        }
    }
}
