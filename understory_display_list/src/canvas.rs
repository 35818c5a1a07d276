// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The canvas capability set.

use alloc::sync::Arc;

use kurbo::{Affine, BezPath, Point, Rect, RoundedRect};
use peniko::Color;

use crate::codec::Array;
use crate::picture::{Drawable, Picture};
use crate::values::{
    BlendMode, ClipOp, IRect, Image, Lattice, Paint, PointMode, Region, RsXform, SaveLayerRec,
    ShadowRec, SrcRectConstraint, TextBlob, Vertices,
};

/// A drawing target with one method per operation kind.
///
/// Playback decodes each record and calls the matching method with the
/// arguments exactly as they were recorded. Every method has an empty default
/// body, so an implementation only overrides what it cares about and ignores
/// the rest; a bare implementation is the "draw nothing" canvas.
///
/// Matrix, clip and save-stack state live entirely in the implementation. The
/// recorded stream only guarantees the call order.
pub trait Canvas {
    /// Flush pending work.
    fn flush(&mut self) {}

    /// Push the current matrix and clip.
    fn save(&mut self) {}

    /// Pop the most recent save or save-layer.
    fn restore(&mut self) {}

    /// Push an offscreen layer along with the matrix and clip.
    fn save_layer(&mut self, _rec: &SaveLayerRec<'_>) {}

    /// Pre-multiply the current matrix by `matrix`.
    fn concat(&mut self, _matrix: &Affine) {}

    /// Replace the current matrix.
    fn set_matrix(&mut self, _matrix: &Affine) {}

    /// Pre-translate the current matrix.
    fn translate(&mut self, _dx: f64, _dy: f64) {}

    /// Translate along the Z axis (used for elevation).
    fn translate_z(&mut self, _dz: f64) {}

    /// Combine the clip with a path.
    fn clip_path(&mut self, _path: &BezPath, _op: ClipOp, _anti_alias: bool) {}

    /// Combine the clip with a rectangle.
    fn clip_rect(&mut self, _rect: &Rect, _op: ClipOp, _anti_alias: bool) {}

    /// Combine the clip with a rounded rectangle.
    fn clip_rrect(&mut self, _rrect: &RoundedRect, _op: ClipOp, _anti_alias: bool) {}

    /// Combine the clip with a device-space region.
    fn clip_region(&mut self, _region: &Region, _op: ClipOp) {}

    /// Fill the whole clip.
    fn draw_paint(&mut self, _paint: &Paint) {}

    /// Draw a path.
    fn draw_path(&mut self, _path: &BezPath, _paint: &Paint) {}

    /// Draw a rectangle.
    fn draw_rect(&mut self, _rect: &Rect, _paint: &Paint) {}

    /// Draw a region.
    fn draw_region(&mut self, _region: &Region, _paint: &Paint) {}

    /// Draw the oval inscribed in `oval`.
    fn draw_oval(&mut self, _oval: &Rect, _paint: &Paint) {}

    /// Draw an arc of the oval inscribed in `oval`. Angles are in degrees.
    fn draw_arc(
        &mut self,
        _oval: &Rect,
        _start_angle: f64,
        _sweep_angle: f64,
        _use_center: bool,
        _paint: &Paint,
    ) {
    }

    /// Draw a rounded rectangle.
    fn draw_rrect(&mut self, _rrect: &RoundedRect, _paint: &Paint) {}

    /// Draw the area between `outer` and `inner`.
    fn draw_drrect(&mut self, _outer: &RoundedRect, _inner: &RoundedRect, _paint: &Paint) {}

    /// Attach an annotation to `rect`.
    fn draw_annotation(&mut self, _rect: &Rect, _key: &str, _value: Option<&[u8]>) {}

    /// Draw a drawable, optionally transformed.
    fn draw_drawable(&mut self, _drawable: &Arc<dyn Drawable>, _matrix: Option<&Affine>) {}

    /// Draw a picture, optionally transformed and composited with `paint`.
    fn draw_picture(
        &mut self,
        _picture: &Arc<Picture>,
        _matrix: Option<&Affine>,
        _paint: Option<&Paint>,
    ) {
    }

    /// Draw encoded text with its origin at `(x, y)`.
    fn draw_text(&mut self, _text: &[u8], _x: f64, _y: f64, _paint: &Paint) {}

    /// Draw encoded text with one position per glyph.
    fn draw_pos_text(&mut self, _text: &[u8], _pos: Array<'_, Point>, _paint: &Paint) {}

    /// Draw encoded text with one X position per glyph on the baseline `const_y`.
    fn draw_pos_text_h(
        &mut self,
        _text: &[u8],
        _xpos: Array<'_, f64>,
        _const_y: f64,
        _paint: &Paint,
    ) {
    }

    /// Draw encoded text with one transform per glyph.
    fn draw_text_rsxform(
        &mut self,
        _text: &[u8],
        _xforms: Array<'_, RsXform>,
        _cull: Option<&Rect>,
        _paint: &Paint,
    ) {
    }

    /// Draw a text blob with its origin at `(x, y)`.
    fn draw_text_blob(&mut self, _blob: &Arc<TextBlob>, _x: f64, _y: f64, _paint: &Paint) {}

    /// Draw an image with its top-left corner at `(x, y)`.
    fn draw_image(&mut self, _image: &Arc<Image>, _x: f64, _y: f64, _paint: Option<&Paint>) {}

    /// Draw an image as a nine-patch: `center` stretches, the corners do not.
    fn draw_image_nine(
        &mut self,
        _image: &Arc<Image>,
        _center: &IRect,
        _dst: &Rect,
        _paint: Option<&Paint>,
    ) {
    }

    /// Draw `src` (or the whole image) of `image` into `dst`.
    fn draw_image_rect(
        &mut self,
        _image: &Arc<Image>,
        _src: Option<&Rect>,
        _dst: &Rect,
        _paint: Option<&Paint>,
        _constraint: SrcRectConstraint,
    ) {
    }

    /// Draw an image stretched through a lattice into `dst`.
    fn draw_image_lattice(
        &mut self,
        _image: &Arc<Image>,
        _lattice: &Lattice<'_>,
        _dst: &Rect,
        _paint: Option<&Paint>,
    ) {
    }

    /// Draw a Coons patch given its twelve cubic control points.
    fn draw_patch(
        &mut self,
        _cubics: &[Point; 12],
        _colors: Option<&[Color; 4]>,
        _tex_coords: Option<&[Point; 4]>,
        _mode: BlendMode,
        _paint: &Paint,
    ) {
    }

    /// Draw a list of points.
    fn draw_points(&mut self, _mode: PointMode, _points: Array<'_, Point>, _paint: &Paint) {}

    /// Draw a triangle mesh.
    fn draw_vertices(&mut self, _vertices: &Arc<Vertices>, _mode: BlendMode, _paint: &Paint) {}

    /// Draw sprites from `atlas`: each `tex` rect is placed by the matching transform.
    fn draw_atlas(
        &mut self,
        _atlas: &Arc<Image>,
        _xforms: Array<'_, RsXform>,
        _tex: Array<'_, Rect>,
        _colors: Option<Array<'_, Color>>,
        _mode: BlendMode,
        _cull: Option<&Rect>,
        _paint: Option<&Paint>,
    ) {
    }

    /// Draw the elevation shadow cast by `path`.
    fn draw_shadow_rec(&mut self, _path: &BezPath, _rec: &ShadowRec) {}
}

/// A canvas that draws nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDrawCanvas;

impl Canvas for NoDrawCanvas {}
