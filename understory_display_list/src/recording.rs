// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The recording session.

use alloc::borrow::Cow;
use alloc::sync::Arc;

use kurbo::{Affine, BezPath, Point, Rect, RoundedRect};
use peniko::Color;

use crate::canvas::Canvas;
use crate::catalog::Op;
use crate::codec::Array;
use crate::data::DisplayListData;
use crate::ops;
use crate::picture::{Drawable, Picture};
use crate::values::{
    BlendMode, ClipOp, IRect, Image, Lattice, Paint, PointMode, Region, RsXform, SaveLayerRec,
    ShadowRec, SrcRectConstraint, TextBlob, Vertices,
};

/// A [`Canvas`] that encodes every call into a [`DisplayListData`] instead of
/// drawing.
///
/// The session tracks no matrix, clip or save depth: those exist only in the
/// recorded stream, and are rebuilt by whichever canvas replays it. Pairing
/// saves with restores is the caller's job.
///
/// State calls are always recorded. Draw calls are dropped when the recording
/// bounds are empty, because nothing they draw could ever be visible;
/// otherwise every draw call becomes exactly one record.
///
/// ```
/// use kurbo::Rect;
/// use peniko::Color;
/// use understory_display_list::{Canvas, DisplayListData, IRect, Paint, RecordingCanvas};
///
/// let mut dl = DisplayListData::new();
/// let mut canvas = RecordingCanvas::new(&mut dl, IRect::from_size(100, 100));
/// canvas.save();
/// canvas.draw_rect(&Rect::new(0.0, 0.0, 10.0, 10.0), &Paint::new(Color::WHITE));
/// canvas.restore();
/// assert_eq!(dl.op_count(), 3);
/// ```
#[derive(Debug)]
pub struct RecordingCanvas<'a> {
    dl: &'a mut DisplayListData,
    bounds: IRect,
}

impl<'a> RecordingCanvas<'a> {
    /// Starts a session appending to `dl`, clipped to `bounds`.
    pub fn new(dl: &'a mut DisplayListData, bounds: IRect) -> Self {
        Self { dl, bounds }
    }

    /// Retargets the session at another buffer and bounds.
    pub fn reset(&mut self, dl: &'a mut DisplayListData, bounds: IRect) {
        self.dl = dl;
        self.bounds = bounds;
    }

    /// The recording bounds.
    pub fn bounds(&self) -> IRect {
        self.bounds
    }

    /// The buffer being recorded into.
    pub fn data(&self) -> &DisplayListData {
        self.dl
    }

    fn record<'o>(&mut self, op: impl Into<Op<'o>>) {
        self.dl.push(op);
    }

    fn record_draw<'o>(&mut self, op: impl Into<Op<'o>>) {
        if !self.bounds.is_empty() {
            self.dl.push(op);
        }
    }
}

impl Canvas for RecordingCanvas<'_> {
    fn flush(&mut self) {
        self.record(ops::Flush);
    }

    fn save(&mut self) {
        self.record(ops::Save);
    }

    fn restore(&mut self) {
        self.record(ops::Restore);
    }

    fn save_layer(&mut self, rec: &SaveLayerRec<'_>) {
        self.record(ops::SaveLayer { rec: *rec });
    }

    fn concat(&mut self, matrix: &Affine) {
        self.record(ops::Concat { matrix: *matrix });
    }

    fn set_matrix(&mut self, matrix: &Affine) {
        self.record(ops::SetMatrix { matrix: *matrix });
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.record(ops::Translate { dx, dy });
    }

    fn translate_z(&mut self, dz: f64) {
        self.record(ops::TranslateZ { dz });
    }

    fn clip_path(&mut self, path: &BezPath, op: ClipOp, anti_alias: bool) {
        self.record(ops::ClipPath {
            path: Cow::Borrowed(path),
            op,
            anti_alias,
        });
    }

    fn clip_rect(&mut self, rect: &Rect, op: ClipOp, anti_alias: bool) {
        self.record(ops::ClipRect {
            rect: *rect,
            op,
            anti_alias,
        });
    }

    fn clip_rrect(&mut self, rrect: &RoundedRect, op: ClipOp, anti_alias: bool) {
        self.record(ops::ClipRRect {
            rrect: *rrect,
            op,
            anti_alias,
        });
    }

    fn clip_region(&mut self, region: &Region, op: ClipOp) {
        self.record(ops::ClipRegion {
            region: Cow::Borrowed(region),
            op,
        });
    }

    fn draw_paint(&mut self, paint: &Paint) {
        self.record_draw(ops::DrawPaint { paint: *paint });
    }

    fn draw_path(&mut self, path: &BezPath, paint: &Paint) {
        self.record_draw(ops::DrawPath {
            path: Cow::Borrowed(path),
            paint: *paint,
        });
    }

    fn draw_rect(&mut self, rect: &Rect, paint: &Paint) {
        self.record_draw(ops::DrawRect {
            rect: *rect,
            paint: *paint,
        });
    }

    fn draw_region(&mut self, region: &Region, paint: &Paint) {
        self.record_draw(ops::DrawRegion {
            region: Cow::Borrowed(region),
            paint: *paint,
        });
    }

    fn draw_oval(&mut self, oval: &Rect, paint: &Paint) {
        self.record_draw(ops::DrawOval {
            oval: *oval,
            paint: *paint,
        });
    }

    fn draw_arc(
        &mut self,
        oval: &Rect,
        start_angle: f64,
        sweep_angle: f64,
        use_center: bool,
        paint: &Paint,
    ) {
        self.record_draw(ops::DrawArc {
            oval: *oval,
            start_angle,
            sweep_angle,
            use_center,
            paint: *paint,
        });
    }

    fn draw_rrect(&mut self, rrect: &RoundedRect, paint: &Paint) {
        self.record_draw(ops::DrawRRect {
            rrect: *rrect,
            paint: *paint,
        });
    }

    fn draw_drrect(&mut self, outer: &RoundedRect, inner: &RoundedRect, paint: &Paint) {
        self.record_draw(ops::DrawDRRect {
            outer: *outer,
            inner: *inner,
            paint: *paint,
        });
    }

    fn draw_annotation(&mut self, rect: &Rect, key: &str, value: Option<&[u8]>) {
        self.record_draw(ops::DrawAnnotation {
            rect: *rect,
            key,
            value,
        });
    }

    fn draw_drawable(&mut self, drawable: &Arc<dyn Drawable>, matrix: Option<&Affine>) {
        self.record_draw(ops::DrawDrawable {
            drawable,
            matrix: matrix.copied(),
        });
    }

    fn draw_picture(
        &mut self,
        picture: &Arc<Picture>,
        matrix: Option<&Affine>,
        paint: Option<&Paint>,
    ) {
        self.record_draw(ops::DrawPicture {
            picture,
            matrix: matrix.copied(),
            paint: paint.copied(),
        });
    }

    fn draw_text(&mut self, text: &[u8], x: f64, y: f64, paint: &Paint) {
        self.record_draw(ops::DrawText {
            text,
            x,
            y,
            paint: *paint,
        });
    }

    fn draw_pos_text(&mut self, text: &[u8], pos: Array<'_, Point>, paint: &Paint) {
        self.record_draw(ops::DrawPosText {
            text,
            pos,
            paint: *paint,
        });
    }

    fn draw_pos_text_h(&mut self, text: &[u8], xpos: Array<'_, f64>, const_y: f64, paint: &Paint) {
        self.record_draw(ops::DrawPosTextH {
            text,
            xpos,
            const_y,
            paint: *paint,
        });
    }

    fn draw_text_rsxform(
        &mut self,
        text: &[u8],
        xforms: Array<'_, RsXform>,
        cull: Option<&Rect>,
        paint: &Paint,
    ) {
        self.record_draw(ops::DrawTextRSXform {
            text,
            xforms,
            cull: cull.copied(),
            paint: *paint,
        });
    }

    fn draw_text_blob(&mut self, blob: &Arc<TextBlob>, x: f64, y: f64, paint: &Paint) {
        self.record_draw(ops::DrawTextBlob {
            blob,
            x,
            y,
            paint: *paint,
        });
    }

    fn draw_image(&mut self, image: &Arc<Image>, x: f64, y: f64, paint: Option<&Paint>) {
        self.record_draw(ops::DrawImage {
            image,
            x,
            y,
            paint: paint.copied(),
        });
    }

    fn draw_image_nine(
        &mut self,
        image: &Arc<Image>,
        center: &IRect,
        dst: &Rect,
        paint: Option<&Paint>,
    ) {
        self.record_draw(ops::DrawImageNine {
            image,
            center: *center,
            dst: *dst,
            paint: paint.copied(),
        });
    }

    fn draw_image_rect(
        &mut self,
        image: &Arc<Image>,
        src: Option<&Rect>,
        dst: &Rect,
        paint: Option<&Paint>,
        constraint: SrcRectConstraint,
    ) {
        self.record_draw(ops::DrawImageRect {
            image,
            src: src.copied(),
            dst: *dst,
            paint: paint.copied(),
            constraint,
        });
    }

    fn draw_image_lattice(
        &mut self,
        image: &Arc<Image>,
        lattice: &Lattice<'_>,
        dst: &Rect,
        paint: Option<&Paint>,
    ) {
        self.record_draw(ops::DrawImageLattice {
            image,
            lattice: *lattice,
            dst: *dst,
            paint: paint.copied(),
        });
    }

    fn draw_patch(
        &mut self,
        cubics: &[Point; 12],
        colors: Option<&[Color; 4]>,
        tex_coords: Option<&[Point; 4]>,
        mode: BlendMode,
        paint: &Paint,
    ) {
        self.record_draw(ops::DrawPatch {
            cubics: *cubics,
            colors: colors.copied(),
            tex_coords: tex_coords.copied(),
            mode,
            paint: *paint,
        });
    }

    fn draw_points(&mut self, mode: PointMode, points: Array<'_, Point>, paint: &Paint) {
        self.record_draw(ops::DrawPoints {
            mode,
            points,
            paint: *paint,
        });
    }

    fn draw_vertices(&mut self, vertices: &Arc<Vertices>, mode: BlendMode, paint: &Paint) {
        self.record_draw(ops::DrawVertices {
            vertices,
            mode,
            paint: *paint,
        });
    }

    fn draw_atlas(
        &mut self,
        atlas: &Arc<Image>,
        xforms: Array<'_, RsXform>,
        tex: Array<'_, Rect>,
        colors: Option<Array<'_, Color>>,
        mode: BlendMode,
        cull: Option<&Rect>,
        paint: Option<&Paint>,
    ) {
        self.record_draw(ops::DrawAtlas {
            atlas,
            xforms,
            tex,
            colors,
            mode,
            cull: cull.copied(),
            paint: paint.copied(),
        });
    }

    fn draw_shadow_rec(&mut self, path: &BezPath, rec: &ShadowRec) {
        self.record_draw(ops::DrawShadowRec {
            path: Cow::Borrowed(path),
            rec: *rec,
        });
    }
}
