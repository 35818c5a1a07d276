// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Value objects carried by display-list records.
//!
//! Geometry comes from [`kurbo`] and color from [`peniko`]. The types here fill
//! the remaining gaps: paints, integer rects and regions, text transforms,
//! lattices, shadows, layer parameters, and the shared-ownership handles
//! (images, text blobs, vertices and filters) that records keep alive.

use alloc::sync::Arc;
use alloc::vec::Vec;

use kurbo::{Cap, Join, Point, Rect};
use peniko::{Color, Compose, ImageAlphaType, ImageFormat, Mix};

use crate::codec::Array;

/// Porter-Duff and separable/non-separable blend modes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[expect(missing_docs, reason = "variant names are the standard blend mode names")]
pub enum BlendMode {
    Clear,
    Src,
    Dst,
    #[default]
    SrcOver,
    DstOver,
    SrcIn,
    DstIn,
    SrcOut,
    DstOut,
    SrcATop,
    DstATop,
    Xor,
    Plus,
    Modulate,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Multiply,
    Hue,
    Saturation,
    Color,
    Luminosity,
}

impl BlendMode {
    /// Convert to the equivalent `peniko` blend mode.
    ///
    /// `Modulate` has no exact `peniko` counterpart and maps to multiply.
    pub fn to_peniko(self) -> peniko::BlendMode {
        let (mix, compose) = match self {
            Self::Clear => (Mix::Normal, Compose::Clear),
            Self::Src => (Mix::Normal, Compose::Copy),
            Self::Dst => (Mix::Normal, Compose::Dest),
            Self::SrcOver => (Mix::Normal, Compose::SrcOver),
            Self::DstOver => (Mix::Normal, Compose::DestOver),
            Self::SrcIn => (Mix::Normal, Compose::SrcIn),
            Self::DstIn => (Mix::Normal, Compose::DestIn),
            Self::SrcOut => (Mix::Normal, Compose::SrcOut),
            Self::DstOut => (Mix::Normal, Compose::DestOut),
            Self::SrcATop => (Mix::Normal, Compose::SrcAtop),
            Self::DstATop => (Mix::Normal, Compose::DestAtop),
            Self::Xor => (Mix::Normal, Compose::Xor),
            Self::Plus => (Mix::Normal, Compose::Plus),
            Self::Modulate | Self::Multiply => (Mix::Multiply, Compose::SrcOver),
            Self::Screen => (Mix::Screen, Compose::SrcOver),
            Self::Overlay => (Mix::Overlay, Compose::SrcOver),
            Self::Darken => (Mix::Darken, Compose::SrcOver),
            Self::Lighten => (Mix::Lighten, Compose::SrcOver),
            Self::ColorDodge => (Mix::ColorDodge, Compose::SrcOver),
            Self::ColorBurn => (Mix::ColorBurn, Compose::SrcOver),
            Self::HardLight => (Mix::HardLight, Compose::SrcOver),
            Self::SoftLight => (Mix::SoftLight, Compose::SrcOver),
            Self::Difference => (Mix::Difference, Compose::SrcOver),
            Self::Exclusion => (Mix::Exclusion, Compose::SrcOver),
            Self::Hue => (Mix::Hue, Compose::SrcOver),
            Self::Saturation => (Mix::Saturation, Compose::SrcOver),
            Self::Color => (Mix::Color, Compose::SrcOver),
            Self::Luminosity => (Mix::Luminosity, Compose::SrcOver),
        };
        peniko::BlendMode::new(mix, compose)
    }
}

/// How a paint covers geometry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PaintStyle {
    /// Fill the interior.
    #[default]
    Fill,
    /// Stroke the outline.
    Stroke,
    /// Fill, then stroke.
    StrokeAndFill,
}

/// Paint state captured by draw records.
///
/// Paints are stored by value. The color is the only field touched by a
/// color transform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Paint {
    /// Solid color.
    pub color: Color,
    /// Fill or stroke.
    pub style: PaintStyle,
    /// Stroke width in user space; zero means hairline.
    pub stroke_width: f32,
    /// Miter limit for [`Join::Miter`].
    pub stroke_miter: f32,
    /// Stroke end cap.
    pub cap: Cap,
    /// Stroke corner join.
    pub join: Join,
    /// Blend mode used to composite the draw.
    pub blend_mode: BlendMode,
    /// Whether edges are anti-aliased.
    pub anti_alias: bool,
}

impl Default for Paint {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            style: PaintStyle::Fill,
            stroke_width: 0.0,
            stroke_miter: 4.0,
            cap: Cap::Butt,
            join: Join::Miter,
            blend_mode: BlendMode::SrcOver,
            anti_alias: false,
        }
    }
}

impl Paint {
    /// A fill paint with the given color.
    pub fn new(color: Color) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }

    /// A stroke paint with the given color and width.
    pub fn stroke(color: Color, width: f32) -> Self {
        Self {
            color,
            style: PaintStyle::Stroke,
            stroke_width: width,
            ..Self::default()
        }
    }

    /// Returns the paint with its blend mode replaced.
    #[must_use]
    pub fn with_blend_mode(mut self, blend_mode: BlendMode) -> Self {
        self.blend_mode = blend_mode;
        self
    }

    /// Returns the paint with anti-aliasing toggled.
    #[must_use]
    pub fn with_anti_alias(mut self, anti_alias: bool) -> Self {
        self.anti_alias = anti_alias;
        self
    }

    /// Returns the paint with its stroke cap and join replaced.
    #[must_use]
    pub fn with_stroke_style(mut self, cap: Cap, join: Join) -> Self {
        self.cap = cap;
        self.join = join;
        self
    }

    /// Returns the paint with `f` applied to its color.
    #[must_use]
    pub fn map_color(mut self, f: &mut dyn FnMut(Color) -> Color) -> Self {
        self.color = f(self.color);
        self
    }
}

/// Clip combination mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ClipOp {
    /// Subtract the shape from the current clip.
    Difference,
    /// Intersect the current clip with the shape.
    #[default]
    Intersect,
}

/// Interpretation of a point list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointMode {
    /// Each point is drawn on its own.
    Points,
    /// Consecutive pairs are drawn as segments.
    Lines,
    /// The points are joined into an open polyline.
    Polygon,
}

/// Sampling constraint for source rectangles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SrcRectConstraint {
    /// Never sample outside the source rectangle.
    Strict,
    /// Sampling may bleed outside the source rectangle.
    #[default]
    Fast,
}

/// Fill rule for a lattice cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LatticeRectType {
    /// Draw the image content.
    #[default]
    Default,
    /// Skip the cell.
    Transparent,
    /// Fill the cell with the matching lattice color.
    FixedColor,
}

/// Triangle assembly for [`Vertices`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[expect(missing_docs, reason = "standard triangle topologies")]
pub enum VertexMode {
    #[default]
    Triangles,
    TriangleStrip,
    TriangleFan,
}

/// An integer rectangle, used for device-space bounds and regions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct IRect {
    /// Left edge (inclusive).
    pub left: i32,
    /// Top edge (inclusive).
    pub top: i32,
    /// Right edge (exclusive).
    pub right: i32,
    /// Bottom edge (exclusive).
    pub bottom: i32,
}

impl IRect {
    /// Creates a rectangle from its edges.
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Creates a rectangle of the given size at the origin.
    pub const fn from_size(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Smallest integer rectangle containing `rect`.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "coordinates are rounded out to integers and saturate at the i32 range"
    )]
    pub fn round_out(rect: Rect) -> Self {
        let rect = rect.abs().expand();
        Self::new(rect.x0 as i32, rect.y0 as i32, rect.x1 as i32, rect.y1 as i32)
    }

    /// Returns `true` if the rectangle covers no pixels.
    pub const fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    /// Smallest rectangle containing both `self` and `other`.
    #[must_use]
    pub fn union(&self, other: Self) -> Self {
        Self::new(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right.max(other.right),
            self.bottom.max(other.bottom),
        )
    }

    /// Convert to a floating point rectangle.
    pub fn to_rect(&self) -> Rect {
        Rect::new(
            f64::from(self.left),
            f64::from(self.top),
            f64::from(self.right),
            f64::from(self.bottom),
        )
    }
}

/// A set of pixels described as a list of rectangles.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Region {
    rects: Vec<IRect>,
}

impl Region {
    /// An empty region.
    pub const fn new() -> Self {
        Self { rects: Vec::new() }
    }

    /// A region covering one rectangle.
    pub fn from_rect(rect: IRect) -> Self {
        Self::from_rects([rect])
    }

    /// A region covering the union of `rects`. Empty rectangles are dropped.
    pub fn from_rects(rects: impl IntoIterator<Item = IRect>) -> Self {
        Self {
            rects: rects.into_iter().filter(|r| !r.is_empty()).collect(),
        }
    }

    /// The rectangles making up the region.
    pub fn rects(&self) -> &[IRect] {
        &self.rects
    }

    /// Returns `true` if the region covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Bounding box of the region, or an empty rect for an empty region.
    pub fn bounds(&self) -> IRect {
        self.rects
            .iter()
            .copied()
            .reduce(|a, b| a.union(b))
            .unwrap_or_default()
    }
}

/// A compressed rotation-scale-translate transform, one per glyph or sprite.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RsXform {
    /// Scale times cosine of the rotation.
    pub scos: f64,
    /// Scale times sine of the rotation.
    pub ssin: f64,
    /// Translation along X.
    pub tx: f64,
    /// Translation along Y.
    pub ty: f64,
}

impl RsXform {
    /// Creates a transform from its components.
    pub const fn new(scos: f64, ssin: f64, tx: f64, ty: f64) -> Self {
        Self { scos, ssin, tx, ty }
    }

    /// A pure translation.
    pub const fn translate(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, tx, ty)
    }

    /// The equivalent affine transform.
    pub fn to_affine(&self) -> kurbo::Affine {
        kurbo::Affine::new([self.scos, self.ssin, -self.ssin, self.scos, self.tx, self.ty])
    }
}

/// Nine-patch style subdivision of an image.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Lattice<'a> {
    /// X coordinates of the vertical dividers, in image space.
    pub x_divs: Array<'a, i32>,
    /// Y coordinates of the horizontal dividers, in image space.
    pub y_divs: Array<'a, i32>,
    /// Optional per-cell fill rule, `(x_divs + 1) * (y_divs + 1)` entries.
    pub rect_types: Option<Array<'a, LatticeRectType>>,
    /// Source bounds inside the image; the full image when absent.
    pub bounds: Option<IRect>,
    /// Optional per-cell colors for [`LatticeRectType::FixedColor`] cells.
    pub colors: Option<Array<'a, Color>>,
}

bitflags::bitflags! {
    /// Shadow rendering flags.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ShadowFlags: u32 {
        /// The occluding object is not opaque.
        const TRANSPARENT_OCCLUDER = 1 << 0;
        /// Only draw the shadow geometry, without blur.
        const GEOMETRIC_ONLY = 1 << 1;
        /// The light position is a direction rather than a point.
        const DIRECTIONAL_LIGHT = 1 << 2;
    }
}

/// Parameters of an elevation shadow.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadowRec {
    /// Coefficients of the occluder's height plane `z = a*x + b*y + c`.
    pub z_plane: [f64; 3],
    /// Light position (or direction).
    pub light_pos: [f64; 3],
    /// Radius of the spot light.
    pub light_radius: f64,
    /// Color of the ambient shadow.
    pub ambient_color: Color,
    /// Color of the spot shadow.
    pub spot_color: Color,
    /// Rendering flags.
    pub flags: ShadowFlags,
}

bitflags::bitflags! {
    /// Layer creation flags.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct SaveLayerFlags: u32 {
        /// Keep LCD text rendering inside the layer.
        const PRESERVE_LCD_TEXT = 1 << 1;
        /// Seed the layer with the content underneath.
        const INIT_WITH_PREVIOUS = 1 << 2;
        /// Allocate the layer with a half-float color type.
        const F16_COLOR_TYPE = 1 << 4;
    }
}

/// Arguments of a save-layer call. Every field is independently optional.
#[derive(Clone, Copy, Debug, Default)]
pub struct SaveLayerRec<'a> {
    /// Bounds hint for the layer.
    pub bounds: Option<Rect>,
    /// Paint applied when the layer is restored.
    pub paint: Option<Paint>,
    /// Filter applied to the backdrop when the layer is created.
    pub backdrop: Option<&'a Arc<ImageFilter>>,
    /// Mask image applied when the layer is restored.
    pub clip_mask: Option<&'a Arc<Image>>,
    /// Transform applied to the clip mask.
    pub clip_matrix: Option<kurbo::Affine>,
    /// Layer creation flags.
    pub flags: SaveLayerFlags,
}

impl<'a> SaveLayerRec<'a> {
    /// A layer with optional bounds and paint.
    pub fn new(bounds: Option<Rect>, paint: Option<Paint>) -> Self {
        Self {
            bounds,
            paint,
            ..Self::default()
        }
    }

    /// Returns the record with a backdrop filter.
    #[must_use]
    pub fn with_backdrop(mut self, backdrop: &'a Arc<ImageFilter>) -> Self {
        self.backdrop = Some(backdrop);
        self
    }

    /// Returns the record with a clip mask and its transform.
    #[must_use]
    pub fn with_clip_mask(mut self, mask: &'a Arc<Image>, matrix: Option<kurbo::Affine>) -> Self {
        self.clip_mask = Some(mask);
        self.clip_matrix = matrix;
        self
    }

    /// Returns the record with the given flags.
    #[must_use]
    pub fn with_flags(mut self, flags: SaveLayerFlags) -> Self {
        self.flags = flags;
        self
    }
}

/// Pixel data shared between records.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel layout.
    pub format: ImageFormat,
    /// Alpha interpretation.
    pub alpha_type: ImageAlphaType,
    /// Row-major pixel bytes.
    pub pixels: Vec<u8>,
}

impl Image {
    /// An RGBA8 image with straight alpha.
    pub fn rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            format: ImageFormat::Rgba8,
            alpha_type: ImageAlphaType::Alpha,
            pixels,
        }
    }

    /// Image bounds in its own pixel space.
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }
}

/// Shaped glyph run shared between records.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextBlob {
    /// Glyph identifiers.
    pub glyphs: Vec<u16>,
    /// Glyph origins, relative to the blob origin.
    pub positions: Vec<Point>,
    /// Conservative bounds, relative to the blob origin.
    pub bounds: Rect,
}

/// Triangle mesh shared between records.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Vertices {
    /// Triangle assembly.
    pub mode: VertexMode,
    /// Vertex positions.
    pub positions: Vec<Point>,
    /// Optional texture coordinates, one per vertex.
    pub tex_coords: Option<Vec<Point>>,
    /// Optional per-vertex colors.
    pub colors: Option<Vec<Color>>,
    /// Optional index list; empty draws the vertices in order.
    pub indices: Vec<u16>,
}

impl Vertices {
    /// Bounding box of the positions.
    pub fn bounds(&self) -> Rect {
        let mut points = self.positions.iter();
        let Some(first) = points.next() else {
            return Rect::ZERO;
        };
        points.fold(Rect::from_points(*first, *first), |acc, p| acc.union_pt(*p))
    }
}

/// Image filter descriptor used as a save-layer backdrop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ImageFilter {
    /// Fill the output with a solid color.
    Flood {
        /// Flood color.
        color: Color,
    },
    /// Gaussian blur with separate X/Y standard deviations in user space.
    Blur {
        /// Standard deviation along X.
        std_deviation_x: f32,
        /// Standard deviation along Y.
        std_deviation_y: f32,
    },
    /// Drop shadow under the source content.
    DropShadow {
        /// Offset along X.
        dx: f32,
        /// Offset along Y.
        dy: f32,
        /// Blur standard deviation along X.
        std_deviation_x: f32,
        /// Blur standard deviation along Y.
        std_deviation_y: f32,
        /// Shadow color.
        color: Color,
    },
    /// Translate the content.
    Offset {
        /// Offset along X.
        dx: f32,
        /// Offset along Y.
        dy: f32,
    },
}

impl ImageFilter {
    /// A flood filter.
    pub const fn flood(color: Color) -> Self {
        Self::Flood { color }
    }

    /// A blur filter.
    pub const fn blur(std_deviation_x: f32, std_deviation_y: f32) -> Self {
        Self::Blur {
            std_deviation_x,
            std_deviation_y,
        }
    }

    /// An offset filter.
    pub const fn offset(dx: f32, dy: f32) -> Self {
        Self::Offset { dx, dy }
    }
}
