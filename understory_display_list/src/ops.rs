// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Operation payloads, one struct per catalog entry.
//!
//! Each payload knows how to encode itself into a record, decode itself from
//! one, replay itself onto a [`Canvas`], and find its color-bearing fields.
//! Fixed-size fields come first; variable-length data (path bodies, arrays,
//! text bytes) trails them, with the element counts stored up front.
//!
//! On the recording side payloads borrow the caller's arguments. Decoded
//! payloads borrow the buffer, except paths and regions, which are rebuilt.

use alloc::borrow::Cow;
use alloc::sync::Arc;

use kurbo::{Affine, BezPath, Point, Rect, RoundedRect};
use peniko::Color;

use crate::canvas::Canvas;
use crate::codec::{Array, ColorCursor, Reader, Writer, count32};
use crate::picture::{Drawable, Picture};
use crate::values::{
    BlendMode, ClipOp, IRect, Image, Lattice, LatticeRectType, Paint, PointMode, Region,
    RsXform, SaveLayerRec, ShadowRec, SrcRectConstraint, TextBlob, Vertices,
};

/// Encoding, decoding and replay of one payload type.
pub(crate) trait Record<'a>: Sized {
    fn encode(&self, writer: &mut Writer<'_>);

    fn decode(reader: &mut Reader<'a>) -> Self;

    fn replay<C: Canvas + ?Sized>(&self, canvas: &mut C);

    /// Rewrites the colors of an encoded payload in place.
    ///
    /// The walk must mirror `encode` up to the last color-bearing field.
    fn map_colors(_cursor: &mut ColorCursor<'_>, _f: &mut dyn FnMut(Color) -> Color) {}
}

/// Payload of [`OpKind::Flush`](crate::OpKind::Flush).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Flush;

impl<'a> Record<'a> for Flush {
    fn encode(&self, _writer: &mut Writer<'_>) {}

    fn decode(_reader: &mut Reader<'a>) -> Self {
        Self
    }

    fn replay<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.flush();
    }
}

/// Payload of [`OpKind::Save`](crate::OpKind::Save).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Save;

impl<'a> Record<'a> for Save {
    fn encode(&self, _writer: &mut Writer<'_>) {}

    fn decode(_reader: &mut Reader<'a>) -> Self {
        Self
    }

    fn replay<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.save();
    }
}

/// Payload of [`OpKind::Restore`](crate::OpKind::Restore).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Restore;

impl<'a> Record<'a> for Restore {
    fn encode(&self, _writer: &mut Writer<'_>) {}

    fn decode(_reader: &mut Reader<'a>) -> Self {
        Self
    }

    fn replay<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.restore();
    }
}

/// Payload of [`OpKind::SaveLayer`](crate::OpKind::SaveLayer).
///
/// All optional arguments share one record with a fixed set of slots.
#[derive(Clone, Copy, Debug, Default)]
pub struct SaveLayer<'a> {
    /// Layer arguments.
    pub rec: SaveLayerRec<'a>,
}

impl<'a> Record<'a> for SaveLayer<'a> {
    fn encode(&self, writer: &mut Writer<'_>) {
        let rec = &self.rec;
        writer.put(rec.bounds);
        writer.put(rec.paint);
        writer.put_optional_handle(rec.backdrop);
        writer.put_optional_handle(rec.clip_mask);
        writer.put(rec.clip_matrix);
        writer.put(rec.flags);
    }

    fn decode(reader: &mut Reader<'a>) -> Self {
        Self {
            rec: SaveLayerRec {
                bounds: reader.get(),
                paint: reader.get(),
                backdrop: reader.optional_handle(),
                clip_mask: reader.optional_handle(),
                clip_matrix: reader.get(),
                flags: reader.get(),
            },
        }
    }

    fn replay<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.save_layer(&self.rec);
    }

    fn map_colors(cursor: &mut ColorCursor<'_>, f: &mut dyn FnMut(Color) -> Color) {
        cursor.skip::<Option<Rect>>();
        cursor.map_optional_paint(f);
    }
}

/// Payload of [`OpKind::Concat`](crate::OpKind::Concat).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Concat {
    /// Matrix to pre-multiply.
    pub matrix: Affine,
}

impl<'a> Record<'a> for Concat {
    fn encode(&self, writer: &mut Writer<'_>) {
        writer.put(self.matrix);
    }

    fn decode(reader: &mut Reader<'a>) -> Self {
        Self {
            matrix: reader.get(),
        }
    }

    fn replay<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.concat(&self.matrix);
    }
}

/// Payload of [`OpKind::SetMatrix`](crate::OpKind::SetMatrix).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SetMatrix {
    /// Replacement matrix.
    pub matrix: Affine,
}

impl<'a> Record<'a> for SetMatrix {
    fn encode(&self, writer: &mut Writer<'_>) {
        writer.put(self.matrix);
    }

    fn decode(reader: &mut Reader<'a>) -> Self {
        Self {
            matrix: reader.get(),
        }
    }

    fn replay<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.set_matrix(&self.matrix);
    }
}

/// Payload of [`OpKind::Translate`](crate::OpKind::Translate).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Translate {
    /// Offset along X.
    pub dx: f64,
    /// Offset along Y.
    pub dy: f64,
}

impl<'a> Record<'a> for Translate {
    fn encode(&self, writer: &mut Writer<'_>) {
        writer.put(self.dx);
        writer.put(self.dy);
    }

    fn decode(reader: &mut Reader<'a>) -> Self {
        Self {
            dx: reader.get(),
            dy: reader.get(),
        }
    }

    fn replay<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.translate(self.dx, self.dy);
    }
}

/// Payload of [`OpKind::TranslateZ`](crate::OpKind::TranslateZ).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TranslateZ {
    /// Offset along Z.
    pub dz: f64,
}

impl<'a> Record<'a> for TranslateZ {
    fn encode(&self, writer: &mut Writer<'_>) {
        writer.put(self.dz);
    }

    fn decode(reader: &mut Reader<'a>) -> Self {
        Self { dz: reader.get() }
    }

    fn replay<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.translate_z(self.dz);
    }
}

/// Payload of [`OpKind::ClipPath`](crate::OpKind::ClipPath).
#[derive(Clone, Debug, PartialEq)]
pub struct ClipPath<'a> {
    /// Clip shape.
    pub path: Cow<'a, BezPath>,
    /// Combination mode.
    pub op: ClipOp,
    /// Anti-aliased clip edges.
    pub anti_alias: bool,
}

impl<'a> Record<'a> for ClipPath<'a> {
    fn encode(&self, writer: &mut Writer<'_>) {
        writer.put_path_counts(&self.path);
        writer.put(self.op);
        writer.put(self.anti_alias);
        writer.put_path_body(&self.path);
    }

    fn decode(reader: &mut Reader<'a>) -> Self {
        let (verbs, points) = reader.path_counts();
        let op = reader.get();
        let anti_alias = reader.get();
        Self {
            path: Cow::Owned(reader.path(verbs, points)),
            op,
            anti_alias,
        }
    }

    fn replay<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.clip_path(&self.path, self.op, self.anti_alias);
    }
}

/// Payload of [`OpKind::ClipRect`](crate::OpKind::ClipRect).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClipRect {
    /// Clip shape.
    pub rect: Rect,
    /// Combination mode.
    pub op: ClipOp,
    /// Anti-aliased clip edges.
    pub anti_alias: bool,
}

impl<'a> Record<'a> for ClipRect {
    fn encode(&self, writer: &mut Writer<'_>) {
        writer.put(self.rect);
        writer.put(self.op);
        writer.put(self.anti_alias);
    }

    fn decode(reader: &mut Reader<'a>) -> Self {
        Self {
            rect: reader.get(),
            op: reader.get(),
            anti_alias: reader.get(),
        }
    }

    fn replay<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.clip_rect(&self.rect, self.op, self.anti_alias);
    }
}

/// Payload of [`OpKind::ClipRRect`](crate::OpKind::ClipRRect).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClipRRect {
    /// Clip shape.
    pub rrect: RoundedRect,
    /// Combination mode.
    pub op: ClipOp,
    /// Anti-aliased clip edges.
    pub anti_alias: bool,
}

impl<'a> Record<'a> for ClipRRect {
    fn encode(&self, writer: &mut Writer<'_>) {
        writer.put(self.rrect);
        writer.put(self.op);
        writer.put(self.anti_alias);
    }

    fn decode(reader: &mut Reader<'a>) -> Self {
        Self {
            rrect: reader.get(),
            op: reader.get(),
            anti_alias: reader.get(),
        }
    }

    fn replay<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.clip_rrect(&self.rrect, self.op, self.anti_alias);
    }
}

/// Payload of [`OpKind::ClipRegion`](crate::OpKind::ClipRegion).
#[derive(Clone, Debug, PartialEq)]
pub struct ClipRegion<'a> {
    /// Clip shape, in device space.
    pub region: Cow<'a, Region>,
    /// Combination mode.
    pub op: ClipOp,
}

impl<'a> Record<'a> for ClipRegion<'a> {
    fn encode(&self, writer: &mut Writer<'_>) {
        writer.put(count32(self.region.rects().len()));
        writer.put(self.op);
        writer.put_array(Array::new(self.region.rects()));
    }

    fn decode(reader: &mut Reader<'a>) -> Self {
        let count = reader.count();
        let op = reader.get();
        let rects = reader.array::<IRect>(count);
        Self {
            region: Cow::Owned(Region::from_rects(rects)),
            op,
        }
    }

    fn replay<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.clip_region(&self.region, self.op);
    }
}

/// Payload of [`OpKind::DrawPaint`](crate::OpKind::DrawPaint).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawPaint {
    /// Fill paint.
    pub paint: Paint,
}

impl<'a> Record<'a> for DrawPaint {
    fn encode(&self, writer: &mut Writer<'_>) {
        writer.put(self.paint);
    }

    fn decode(reader: &mut Reader<'a>) -> Self {
        Self {
            paint: reader.get(),
        }
    }

    fn replay<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.draw_paint(&self.paint);
    }

    fn map_colors(cursor: &mut ColorCursor<'_>, f: &mut dyn FnMut(Color) -> Color) {
        cursor.map_paint(f);
    }
}

/// Payload of [`OpKind::DrawPath`](crate::OpKind::DrawPath).
#[derive(Clone, Debug, PartialEq)]
pub struct DrawPath<'a> {
    /// Shape.
    pub path: Cow<'a, BezPath>,
    /// Paint.
    pub paint: Paint,
}

impl<'a> Record<'a> for DrawPath<'a> {
    fn encode(&self, writer: &mut Writer<'_>) {
        writer.put_path_counts(&self.path);
        writer.put(self.paint);
        writer.put_path_body(&self.path);
    }

    fn decode(reader: &mut Reader<'a>) -> Self {
        let (verbs, points) = reader.path_counts();
        let paint = reader.get();
        Self {
            path: Cow::Owned(reader.path(verbs, points)),
            paint,
        }
    }

    fn replay<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.draw_path(&self.path, &self.paint);
    }

    fn map_colors(cursor: &mut ColorCursor<'_>, f: &mut dyn FnMut(Color) -> Color) {
        cursor.skip_n::<u32>(2);
        cursor.map_paint(f);
    }
}

/// Payload of [`OpKind::DrawRect`](crate::OpKind::DrawRect).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawRect {
    /// Shape.
    pub rect: Rect,
    /// Paint.
    pub paint: Paint,
}

impl<'a> Record<'a> for DrawRect {
    fn encode(&self, writer: &mut Writer<'_>) {
        writer.put(self.rect);
        writer.put(self.paint);
    }

    fn decode(reader: &mut Reader<'a>) -> Self {
        Self {
            rect: reader.get(),
            paint: reader.get(),
        }
    }

    fn replay<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.draw_rect(&self.rect, &self.paint);
    }

    fn map_colors(cursor: &mut ColorCursor<'_>, f: &mut dyn FnMut(Color) -> Color) {
        cursor.skip::<Rect>();
        cursor.map_paint(f);
    }
}

/// Payload of [`OpKind::DrawRegion`](crate::OpKind::DrawRegion).
#[derive(Clone, Debug, PartialEq)]
pub struct DrawRegion<'a> {
    /// Shape, in device space.
    pub region: Cow<'a, Region>,
    /// Paint.
    pub paint: Paint,
}

impl<'a> Record<'a> for DrawRegion<'a> {
    fn encode(&self, writer: &mut Writer<'_>) {
        writer.put(count32(self.region.rects().len()));
        writer.put(self.paint);
        writer.put_array(Array::new(self.region.rects()));
    }

    fn decode(reader: &mut Reader<'a>) -> Self {
        let count = reader.count();
        let paint = reader.get();
        let rects = reader.array::<IRect>(count);
        Self {
            region: Cow::Owned(Region::from_rects(rects)),
            paint,
        }
    }

    fn replay<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.draw_region(&self.region, &self.paint);
    }

    fn map_colors(cursor: &mut ColorCursor<'_>, f: &mut dyn FnMut(Color) -> Color) {
        cursor.skip::<u32>();
        cursor.map_paint(f);
    }
}

/// Payload of [`OpKind::DrawOval`](crate::OpKind::DrawOval).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawOval {
    /// Bounds of the oval.
    pub oval: Rect,
    /// Paint.
    pub paint: Paint,
}

impl<'a> Record<'a> for DrawOval {
    fn encode(&self, writer: &mut Writer<'_>) {
        writer.put(self.oval);
        writer.put(self.paint);
    }

    fn decode(reader: &mut Reader<'a>) -> Self {
        Self {
            oval: reader.get(),
            paint: reader.get(),
        }
    }

    fn replay<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.draw_oval(&self.oval, &self.paint);
    }

    fn map_colors(cursor: &mut ColorCursor<'_>, f: &mut dyn FnMut(Color) -> Color) {
        cursor.skip::<Rect>();
        cursor.map_paint(f);
    }
}

/// Payload of [`OpKind::DrawArc`](crate::OpKind::DrawArc).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawArc {
    /// Bounds of the oval.
    pub oval: Rect,
    /// Start angle in degrees.
    pub start_angle: f64,
    /// Sweep in degrees.
    pub sweep_angle: f64,
    /// Close the arc through the center.
    pub use_center: bool,
    /// Paint.
    pub paint: Paint,
}

impl<'a> Record<'a> for DrawArc {
    fn encode(&self, writer: &mut Writer<'_>) {
        writer.put(self.oval);
        writer.put(self.start_angle);
        writer.put(self.sweep_angle);
        writer.put(self.use_center);
        writer.put(self.paint);
    }

    fn decode(reader: &mut Reader<'a>) -> Self {
        Self {
            oval: reader.get(),
            start_angle: reader.get(),
            sweep_angle: reader.get(),
            use_center: reader.get(),
            paint: reader.get(),
        }
    }

    fn replay<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.draw_arc(
            &self.oval,
            self.start_angle,
            self.sweep_angle,
            self.use_center,
            &self.paint,
        );
    }

    fn map_colors(cursor: &mut ColorCursor<'_>, f: &mut dyn FnMut(Color) -> Color) {
        cursor.skip::<Rect>();
        cursor.skip_n::<f64>(2);
        cursor.skip::<bool>();
        cursor.map_paint(f);
    }
}

/// Payload of [`OpKind::DrawRRect`](crate::OpKind::DrawRRect).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawRRect {
    /// Shape.
    pub rrect: RoundedRect,
    /// Paint.
    pub paint: Paint,
}

impl<'a> Record<'a> for DrawRRect {
    fn encode(&self, writer: &mut Writer<'_>) {
        writer.put(self.rrect);
        writer.put(self.paint);
    }

    fn decode(reader: &mut Reader<'a>) -> Self {
        Self {
            rrect: reader.get(),
            paint: reader.get(),
        }
    }

    fn replay<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.draw_rrect(&self.rrect, &self.paint);
    }

    fn map_colors(cursor: &mut ColorCursor<'_>, f: &mut dyn FnMut(Color) -> Color) {
        cursor.skip::<RoundedRect>();
        cursor.map_paint(f);
    }
}

/// Payload of [`OpKind::DrawDRRect`](crate::OpKind::DrawDRRect).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawDRRect {
    /// Outer edge.
    pub outer: RoundedRect,
    /// Inner edge.
    pub inner: RoundedRect,
    /// Paint.
    pub paint: Paint,
}

impl<'a> Record<'a> for DrawDRRect {
    fn encode(&self, writer: &mut Writer<'_>) {
        writer.put(self.outer);
        writer.put(self.inner);
        writer.put(self.paint);
    }

    fn decode(reader: &mut Reader<'a>) -> Self {
        Self {
            outer: reader.get(),
            inner: reader.get(),
            paint: reader.get(),
        }
    }

    fn replay<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.draw_drrect(&self.outer, &self.inner, &self.paint);
    }

    fn map_colors(cursor: &mut ColorCursor<'_>, f: &mut dyn FnMut(Color) -> Color) {
        cursor.skip_n::<RoundedRect>(2);
        cursor.map_paint(f);
    }
}

/// Payload of [`OpKind::DrawAnnotation`](crate::OpKind::DrawAnnotation).
///
/// The key is stored NUL-terminated, followed by the value bytes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawAnnotation<'a> {
    /// Annotated area.
    pub rect: Rect,
    /// Annotation key.
    pub key: &'a str,
    /// Opaque annotation value.
    pub value: Option<&'a [u8]>,
}

impl<'a> Record<'a> for DrawAnnotation<'a> {
    fn encode(&self, writer: &mut Writer<'_>) {
        writer.put(self.rect);
        writer.put(count32(self.key.len() + 1));
        writer.put(self.value.map(|value| count32(value.len())));
        writer.put_bytes(self.key.as_bytes());
        writer.put(0_u8);
        if let Some(value) = self.value {
            writer.put_bytes(value);
        }
    }

    fn decode(reader: &mut Reader<'a>) -> Self {
        let rect = reader.get();
        let key_len = reader.count();
        let value_len: Option<u32> = reader.get();
        let (key, nul) = reader.bytes(key_len).split_at(key_len.saturating_sub(1));
        assert_eq!(nul, [0_u8], "display list: annotation key is not NUL-terminated");
        let key = core::str::from_utf8(key).expect("display list: annotation key is not UTF-8");
        Self {
            rect,
            key,
            value: value_len.map(|len| reader.bytes(len as usize)),
        }
    }

    fn replay<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.draw_annotation(&self.rect, self.key, self.value);
    }
}

/// Payload of [`OpKind::DrawDrawable`](crate::OpKind::DrawDrawable).
#[derive(Clone, Debug)]
pub struct DrawDrawable<'a> {
    /// The drawable, kept alive by the buffer.
    pub drawable: &'a Arc<dyn Drawable>,
    /// Optional transform.
    pub matrix: Option<Affine>,
}

impl<'a> Record<'a> for DrawDrawable<'a> {
    fn encode(&self, writer: &mut Writer<'_>) {
        writer.put_handle(self.drawable);
        writer.put(self.matrix);
    }

    fn decode(reader: &mut Reader<'a>) -> Self {
        Self {
            drawable: reader.handle(),
            matrix: reader.get(),
        }
    }

    fn replay<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.draw_drawable(self.drawable, self.matrix.as_ref());
    }
}

/// Payload of [`OpKind::DrawPicture`](crate::OpKind::DrawPicture).
#[derive(Clone, Debug)]
pub struct DrawPicture<'a> {
    /// The picture, kept alive by the buffer.
    pub picture: &'a Arc<Picture>,
    /// Optional transform.
    pub matrix: Option<Affine>,
    /// Optional compositing paint.
    pub paint: Option<Paint>,
}

impl<'a> Record<'a> for DrawPicture<'a> {
    fn encode(&self, writer: &mut Writer<'_>) {
        writer.put_handle(self.picture);
        writer.put(self.matrix);
        writer.put(self.paint);
    }

    fn decode(reader: &mut Reader<'a>) -> Self {
        Self {
            picture: reader.handle(),
            matrix: reader.get(),
            paint: reader.get(),
        }
    }

    fn replay<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.draw_picture(self.picture, self.matrix.as_ref(), self.paint.as_ref());
    }

    fn map_colors(cursor: &mut ColorCursor<'_>, f: &mut dyn FnMut(Color) -> Color) {
        cursor.skip_handle();
        cursor.skip::<Option<Affine>>();
        cursor.map_optional_paint(f);
    }
}

/// Payload of [`OpKind::DrawText`](crate::OpKind::DrawText).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawText<'a> {
    /// Encoded text.
    pub text: &'a [u8],
    /// Origin X.
    pub x: f64,
    /// Origin Y.
    pub y: f64,
    /// Paint.
    pub paint: Paint,
}

impl<'a> Record<'a> for DrawText<'a> {
    fn encode(&self, writer: &mut Writer<'_>) {
        writer.put(count32(self.text.len()));
        writer.put(self.x);
        writer.put(self.y);
        writer.put(self.paint);
        writer.put_bytes(self.text);
    }

    fn decode(reader: &mut Reader<'a>) -> Self {
        let len = reader.count();
        let x = reader.get();
        let y = reader.get();
        let paint = reader.get();
        Self {
            text: reader.bytes(len),
            x,
            y,
            paint,
        }
    }

    fn replay<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.draw_text(self.text, self.x, self.y, &self.paint);
    }

    fn map_colors(cursor: &mut ColorCursor<'_>, f: &mut dyn FnMut(Color) -> Color) {
        cursor.skip::<u32>();
        cursor.skip_n::<f64>(2);
        cursor.map_paint(f);
    }
}

/// Payload of [`OpKind::DrawPosText`](crate::OpKind::DrawPosText).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawPosText<'a> {
    /// Encoded text.
    pub text: &'a [u8],
    /// One position per glyph.
    pub pos: Array<'a, Point>,
    /// Paint.
    pub paint: Paint,
}

impl<'a> Record<'a> for DrawPosText<'a> {
    fn encode(&self, writer: &mut Writer<'_>) {
        writer.put(count32(self.text.len()));
        writer.put(count32(self.pos.len()));
        writer.put(self.paint);
        writer.put_array(self.pos);
        writer.put_bytes(self.text);
    }

    fn decode(reader: &mut Reader<'a>) -> Self {
        let len = reader.count();
        let count = reader.count();
        let paint = reader.get();
        let pos = reader.array(count);
        Self {
            text: reader.bytes(len),
            pos,
            paint,
        }
    }

    fn replay<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.draw_pos_text(self.text, self.pos, &self.paint);
    }

    fn map_colors(cursor: &mut ColorCursor<'_>, f: &mut dyn FnMut(Color) -> Color) {
        cursor.skip_n::<u32>(2);
        cursor.map_paint(f);
    }
}

/// Payload of [`OpKind::DrawPosTextH`](crate::OpKind::DrawPosTextH).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawPosTextH<'a> {
    /// Encoded text.
    pub text: &'a [u8],
    /// One X position per glyph.
    pub xpos: Array<'a, f64>,
    /// Shared baseline.
    pub const_y: f64,
    /// Paint.
    pub paint: Paint,
}

impl<'a> Record<'a> for DrawPosTextH<'a> {
    fn encode(&self, writer: &mut Writer<'_>) {
        writer.put(count32(self.text.len()));
        writer.put(count32(self.xpos.len()));
        writer.put(self.const_y);
        writer.put(self.paint);
        writer.put_array(self.xpos);
        writer.put_bytes(self.text);
    }

    fn decode(reader: &mut Reader<'a>) -> Self {
        let len = reader.count();
        let count = reader.count();
        let const_y = reader.get();
        let paint = reader.get();
        let xpos = reader.array(count);
        Self {
            text: reader.bytes(len),
            xpos,
            const_y,
            paint,
        }
    }

    fn replay<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.draw_pos_text_h(self.text, self.xpos, self.const_y, &self.paint);
    }

    fn map_colors(cursor: &mut ColorCursor<'_>, f: &mut dyn FnMut(Color) -> Color) {
        cursor.skip_n::<u32>(2);
        cursor.skip::<f64>();
        cursor.map_paint(f);
    }
}

/// Payload of [`OpKind::DrawTextRSXform`](crate::OpKind::DrawTextRSXform).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawTextRSXform<'a> {
    /// Encoded text.
    pub text: &'a [u8],
    /// One transform per glyph.
    pub xforms: Array<'a, RsXform>,
    /// Optional conservative bounds.
    pub cull: Option<Rect>,
    /// Paint.
    pub paint: Paint,
}

impl<'a> Record<'a> for DrawTextRSXform<'a> {
    fn encode(&self, writer: &mut Writer<'_>) {
        writer.put(count32(self.text.len()));
        writer.put(count32(self.xforms.len()));
        writer.put(self.cull);
        writer.put(self.paint);
        writer.put_array(self.xforms);
        writer.put_bytes(self.text);
    }

    fn decode(reader: &mut Reader<'a>) -> Self {
        let len = reader.count();
        let count = reader.count();
        let cull = reader.get();
        let paint = reader.get();
        let xforms = reader.array(count);
        Self {
            text: reader.bytes(len),
            xforms,
            cull,
            paint,
        }
    }

    fn replay<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.draw_text_rsxform(self.text, self.xforms, self.cull.as_ref(), &self.paint);
    }

    fn map_colors(cursor: &mut ColorCursor<'_>, f: &mut dyn FnMut(Color) -> Color) {
        cursor.skip_n::<u32>(2);
        cursor.skip::<Option<Rect>>();
        cursor.map_paint(f);
    }
}

/// Payload of [`OpKind::DrawTextBlob`](crate::OpKind::DrawTextBlob).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawTextBlob<'a> {
    /// The blob, kept alive by the buffer.
    pub blob: &'a Arc<TextBlob>,
    /// Origin X.
    pub x: f64,
    /// Origin Y.
    pub y: f64,
    /// Paint.
    pub paint: Paint,
}

impl<'a> Record<'a> for DrawTextBlob<'a> {
    fn encode(&self, writer: &mut Writer<'_>) {
        writer.put_handle(self.blob);
        writer.put(self.x);
        writer.put(self.y);
        writer.put(self.paint);
    }

    fn decode(reader: &mut Reader<'a>) -> Self {
        Self {
            blob: reader.handle(),
            x: reader.get(),
            y: reader.get(),
            paint: reader.get(),
        }
    }

    fn replay<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.draw_text_blob(self.blob, self.x, self.y, &self.paint);
    }

    fn map_colors(cursor: &mut ColorCursor<'_>, f: &mut dyn FnMut(Color) -> Color) {
        cursor.skip_handle();
        cursor.skip_n::<f64>(2);
        cursor.map_paint(f);
    }
}

/// Payload of [`OpKind::DrawImage`](crate::OpKind::DrawImage).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawImage<'a> {
    /// The image, kept alive by the buffer.
    pub image: &'a Arc<Image>,
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Optional paint.
    pub paint: Option<Paint>,
}

impl<'a> Record<'a> for DrawImage<'a> {
    fn encode(&self, writer: &mut Writer<'_>) {
        writer.put_handle(self.image);
        writer.put(self.x);
        writer.put(self.y);
        writer.put(self.paint);
    }

    fn decode(reader: &mut Reader<'a>) -> Self {
        Self {
            image: reader.handle(),
            x: reader.get(),
            y: reader.get(),
            paint: reader.get(),
        }
    }

    fn replay<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.draw_image(self.image, self.x, self.y, self.paint.as_ref());
    }

    fn map_colors(cursor: &mut ColorCursor<'_>, f: &mut dyn FnMut(Color) -> Color) {
        cursor.skip_handle();
        cursor.skip_n::<f64>(2);
        cursor.map_optional_paint(f);
    }
}

/// Payload of [`OpKind::DrawImageNine`](crate::OpKind::DrawImageNine).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawImageNine<'a> {
    /// The image, kept alive by the buffer.
    pub image: &'a Arc<Image>,
    /// Stretchable center, in image space.
    pub center: IRect,
    /// Destination.
    pub dst: Rect,
    /// Optional paint.
    pub paint: Option<Paint>,
}

impl<'a> Record<'a> for DrawImageNine<'a> {
    fn encode(&self, writer: &mut Writer<'_>) {
        writer.put_handle(self.image);
        writer.put(self.center);
        writer.put(self.dst);
        writer.put(self.paint);
    }

    fn decode(reader: &mut Reader<'a>) -> Self {
        Self {
            image: reader.handle(),
            center: reader.get(),
            dst: reader.get(),
            paint: reader.get(),
        }
    }

    fn replay<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.draw_image_nine(self.image, &self.center, &self.dst, self.paint.as_ref());
    }

    fn map_colors(cursor: &mut ColorCursor<'_>, f: &mut dyn FnMut(Color) -> Color) {
        cursor.skip_handle();
        cursor.skip::<IRect>();
        cursor.skip::<Rect>();
        cursor.map_optional_paint(f);
    }
}

/// Payload of [`OpKind::DrawImageRect`](crate::OpKind::DrawImageRect).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawImageRect<'a> {
    /// The image, kept alive by the buffer.
    pub image: &'a Arc<Image>,
    /// Source area; the whole image when absent.
    pub src: Option<Rect>,
    /// Destination.
    pub dst: Rect,
    /// Optional paint.
    pub paint: Option<Paint>,
    /// Sampling constraint.
    pub constraint: SrcRectConstraint,
}

impl<'a> Record<'a> for DrawImageRect<'a> {
    fn encode(&self, writer: &mut Writer<'_>) {
        writer.put_handle(self.image);
        writer.put(self.src);
        writer.put(self.dst);
        writer.put(self.paint);
        writer.put(self.constraint);
    }

    fn decode(reader: &mut Reader<'a>) -> Self {
        Self {
            image: reader.handle(),
            src: reader.get(),
            dst: reader.get(),
            paint: reader.get(),
            constraint: reader.get(),
        }
    }

    fn replay<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.draw_image_rect(
            self.image,
            self.src.as_ref(),
            &self.dst,
            self.paint.as_ref(),
            self.constraint,
        );
    }

    fn map_colors(cursor: &mut ColorCursor<'_>, f: &mut dyn FnMut(Color) -> Color) {
        cursor.skip_handle();
        cursor.skip::<Option<Rect>>();
        cursor.skip::<Rect>();
        cursor.map_optional_paint(f);
    }
}

/// Payload of [`OpKind::DrawImageLattice`](crate::OpKind::DrawImageLattice).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawImageLattice<'a> {
    /// The image, kept alive by the buffer.
    pub image: &'a Arc<Image>,
    /// Subdivision of the image.
    pub lattice: Lattice<'a>,
    /// Destination.
    pub dst: Rect,
    /// Optional paint.
    pub paint: Option<Paint>,
}

impl<'a> Record<'a> for DrawImageLattice<'a> {
    fn encode(&self, writer: &mut Writer<'_>) {
        let lattice = &self.lattice;
        writer.put_handle(self.image);
        writer.put(count32(lattice.x_divs.len()));
        writer.put(count32(lattice.y_divs.len()));
        writer.put(lattice.rect_types.map(|types| count32(types.len())));
        writer.put(lattice.colors.map(|colors| count32(colors.len())));
        writer.put(lattice.bounds);
        writer.put(self.dst);
        writer.put(self.paint);
        writer.put_array(lattice.x_divs);
        writer.put_array(lattice.y_divs);
        if let Some(types) = lattice.rect_types {
            writer.put_array(types);
        }
        if let Some(colors) = lattice.colors {
            writer.put_array(colors);
        }
    }

    fn decode(reader: &mut Reader<'a>) -> Self {
        let image = reader.handle();
        let x_count = reader.count();
        let y_count = reader.count();
        let type_count: Option<u32> = reader.get();
        let color_count: Option<u32> = reader.get();
        let bounds = reader.get();
        let dst = reader.get();
        let paint = reader.get();
        let x_divs = reader.array(x_count);
        let y_divs = reader.array(y_count);
        let rect_types = type_count.map(|n| reader.array::<LatticeRectType>(n as usize));
        let colors = color_count.map(|n| reader.array::<Color>(n as usize));
        Self {
            image,
            lattice: Lattice {
                x_divs,
                y_divs,
                rect_types,
                bounds,
                colors,
            },
            dst,
            paint,
        }
    }

    fn replay<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.draw_image_lattice(self.image, &self.lattice, &self.dst, self.paint.as_ref());
    }

    fn map_colors(cursor: &mut ColorCursor<'_>, f: &mut dyn FnMut(Color) -> Color) {
        cursor.skip_handle();
        let x_count = cursor.count();
        let y_count = cursor.count();
        let type_count = cursor.read::<Option<u32>>().unwrap_or(0);
        let color_count = cursor.read::<Option<u32>>().unwrap_or(0);
        cursor.skip::<Option<IRect>>();
        cursor.skip::<Rect>();
        cursor.map_optional_paint(f);
        cursor.skip_n::<i32>(x_count + y_count);
        cursor.skip_n::<LatticeRectType>(type_count as usize);
        cursor.map_colors(color_count as usize, f);
    }
}

/// Payload of [`OpKind::DrawPatch`](crate::OpKind::DrawPatch).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawPatch {
    /// Control points of the four boundary cubics, clockwise from the top-left.
    pub cubics: [Point; 12],
    /// Optional corner colors.
    pub colors: Option<[Color; 4]>,
    /// Optional corner texture coordinates.
    pub tex_coords: Option<[Point; 4]>,
    /// Blend between corner colors and the paint.
    pub mode: BlendMode,
    /// Paint.
    pub paint: Paint,
}

impl<'a> Record<'a> for DrawPatch {
    fn encode(&self, writer: &mut Writer<'_>) {
        writer.put(self.cubics);
        writer.put(self.colors);
        writer.put(self.tex_coords);
        writer.put(self.mode);
        writer.put(self.paint);
    }

    fn decode(reader: &mut Reader<'a>) -> Self {
        Self {
            cubics: reader.get(),
            colors: reader.get(),
            tex_coords: reader.get(),
            mode: reader.get(),
            paint: reader.get(),
        }
    }

    fn replay<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.draw_patch(
            &self.cubics,
            self.colors.as_ref(),
            self.tex_coords.as_ref(),
            self.mode,
            &self.paint,
        );
    }

    fn map_colors(cursor: &mut ColorCursor<'_>, f: &mut dyn FnMut(Color) -> Color) {
        cursor.skip::<[Point; 12]>();
        cursor.map(|colors: Option<[Color; 4]>| colors.map(|colors| colors.map(&mut *f)));
        cursor.skip::<Option<[Point; 4]>>();
        cursor.skip::<BlendMode>();
        cursor.map_paint(f);
    }
}

/// Payload of [`OpKind::DrawPoints`](crate::OpKind::DrawPoints).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawPoints<'a> {
    /// How the points are connected.
    pub mode: PointMode,
    /// The points.
    pub points: Array<'a, Point>,
    /// Paint.
    pub paint: Paint,
}

impl<'a> Record<'a> for DrawPoints<'a> {
    fn encode(&self, writer: &mut Writer<'_>) {
        writer.put(self.mode);
        writer.put(count32(self.points.len()));
        writer.put(self.paint);
        writer.put_array(self.points);
    }

    fn decode(reader: &mut Reader<'a>) -> Self {
        let mode = reader.get();
        let count = reader.count();
        let paint = reader.get();
        Self {
            mode,
            points: reader.array(count),
            paint,
        }
    }

    fn replay<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.draw_points(self.mode, self.points, &self.paint);
    }

    fn map_colors(cursor: &mut ColorCursor<'_>, f: &mut dyn FnMut(Color) -> Color) {
        cursor.skip::<PointMode>();
        cursor.skip::<u32>();
        cursor.map_paint(f);
    }
}

/// Payload of [`OpKind::DrawVertices`](crate::OpKind::DrawVertices).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawVertices<'a> {
    /// The mesh, kept alive by the buffer.
    pub vertices: &'a Arc<Vertices>,
    /// Blend between vertex colors and the paint.
    pub mode: BlendMode,
    /// Paint.
    pub paint: Paint,
}

impl<'a> Record<'a> for DrawVertices<'a> {
    fn encode(&self, writer: &mut Writer<'_>) {
        writer.put_handle(self.vertices);
        writer.put(self.mode);
        writer.put(self.paint);
    }

    fn decode(reader: &mut Reader<'a>) -> Self {
        Self {
            vertices: reader.handle(),
            mode: reader.get(),
            paint: reader.get(),
        }
    }

    fn replay<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.draw_vertices(self.vertices, self.mode, &self.paint);
    }

    fn map_colors(cursor: &mut ColorCursor<'_>, f: &mut dyn FnMut(Color) -> Color) {
        cursor.skip_handle();
        cursor.skip::<BlendMode>();
        cursor.map_paint(f);
    }
}

/// Payload of [`OpKind::DrawAtlas`](crate::OpKind::DrawAtlas).
///
/// `xforms`, `tex` and `colors` (when present) have the same length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawAtlas<'a> {
    /// The atlas image, kept alive by the buffer.
    pub atlas: &'a Arc<Image>,
    /// One transform per sprite.
    pub xforms: Array<'a, RsXform>,
    /// One source rect per sprite.
    pub tex: Array<'a, Rect>,
    /// Optional color per sprite.
    pub colors: Option<Array<'a, Color>>,
    /// Blend between sprite colors and the image.
    pub mode: BlendMode,
    /// Optional conservative bounds.
    pub cull: Option<Rect>,
    /// Optional paint.
    pub paint: Option<Paint>,
}

impl<'a> Record<'a> for DrawAtlas<'a> {
    fn encode(&self, writer: &mut Writer<'_>) {
        let count = self.xforms.len();
        assert_eq!(self.tex.len(), count, "draw_atlas: one tex rect per transform");
        if let Some(colors) = self.colors {
            assert_eq!(colors.len(), count, "draw_atlas: one color per transform");
        }
        writer.put_handle(self.atlas);
        writer.put(count32(count));
        writer.put(self.colors.is_some());
        writer.put(self.mode);
        writer.put(self.cull);
        writer.put(self.paint);
        writer.put_array(self.xforms);
        writer.put_array(self.tex);
        if let Some(colors) = self.colors {
            writer.put_array(colors);
        }
    }

    fn decode(reader: &mut Reader<'a>) -> Self {
        let atlas = reader.handle();
        let count = reader.count();
        let has_colors: bool = reader.get();
        let mode = reader.get();
        let cull = reader.get();
        let paint = reader.get();
        let xforms = reader.array(count);
        let tex = reader.array(count);
        let colors = has_colors.then(|| reader.array(count));
        Self {
            atlas,
            xforms,
            tex,
            colors,
            mode,
            cull,
            paint,
        }
    }

    fn replay<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.draw_atlas(
            self.atlas,
            self.xforms,
            self.tex,
            self.colors,
            self.mode,
            self.cull.as_ref(),
            self.paint.as_ref(),
        );
    }

    fn map_colors(cursor: &mut ColorCursor<'_>, f: &mut dyn FnMut(Color) -> Color) {
        cursor.skip_handle();
        let count = cursor.count();
        let has_colors: bool = cursor.read();
        cursor.skip::<BlendMode>();
        cursor.skip::<Option<Rect>>();
        cursor.map_optional_paint(f);
        if has_colors {
            cursor.skip_n::<RsXform>(count);
            cursor.skip_n::<Rect>(count);
            cursor.map_colors(count, f);
        }
    }
}

/// Payload of [`OpKind::DrawShadowRec`](crate::OpKind::DrawShadowRec).
#[derive(Clone, Debug, PartialEq)]
pub struct DrawShadowRec<'a> {
    /// Occluder outline.
    pub path: Cow<'a, BezPath>,
    /// Shadow parameters.
    pub rec: ShadowRec,
}

impl<'a> Record<'a> for DrawShadowRec<'a> {
    fn encode(&self, writer: &mut Writer<'_>) {
        writer.put_path_counts(&self.path);
        writer.put(self.rec);
        writer.put_path_body(&self.path);
    }

    fn decode(reader: &mut Reader<'a>) -> Self {
        let (verbs, points) = reader.path_counts();
        let rec = reader.get();
        Self {
            path: Cow::Owned(reader.path(verbs, points)),
            rec,
        }
    }

    fn replay<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.draw_shadow_rec(&self.path, &self.rec);
    }

    fn map_colors(cursor: &mut ColorCursor<'_>, f: &mut dyn FnMut(Color) -> Color) {
        cursor.skip_n::<u32>(2);
        cursor.map(|rec: ShadowRec| ShadowRec {
            ambient_color: f(rec.ambient_color),
            spot_color: f(rec.spot_color),
            ..rec
        });
    }
}
