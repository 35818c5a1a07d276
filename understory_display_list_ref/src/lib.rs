// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Display List Reference Canvas.
//!
//! This crate provides [`RefCanvas`], a small, stateful implementation of
//! [`Canvas`] for **playback tracing**.
//!
//! It is intentionally *not* a renderer:
//! - It does **not** rasterize to pixels.
//! - It tracks only the state a display list can change: the matrix, the Z
//!   offset, the save and layer stacks, and how many clips are active.
//! - It is intended primarily for tests and debugging that want to assert on
//!   the calls a display list replays and the state each draw sees.
//!
//! ```rust
//! use kurbo::Rect;
//! use understory_display_list::{Canvas, DisplayListData, IRect, Paint, RecordingCanvas};
//! use understory_display_list_ref::RefCanvas;
//!
//! let mut dl = DisplayListData::new();
//! let mut rec = RecordingCanvas::new(&mut dl, IRect::from_size(100, 100));
//! rec.save();
//! rec.translate(5.0, 5.0);
//! rec.draw_rect(&Rect::new(0.0, 0.0, 10.0, 10.0), &Paint::default());
//! rec.restore();
//!
//! let mut canvas = RefCanvas::new();
//! dl.draw(&mut canvas);
//! assert_eq!(canvas.draws().count(), 1);
//! assert!(canvas.check_balanced().is_ok());
//! ```

#![no_std]

extern crate alloc;

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Affine, BezPath, Point, Rect, RoundedRect, Shape, Vec2};
use peniko::Color;
use smallvec::SmallVec;
use understory_display_list::{
    Array, BlendMode, Canvas, ClipOp, Drawable, IRect, Image, Lattice, OpKind, Paint, Picture,
    PointMode, Region, RsXform, SaveLayerRec, ShadowRec, SrcRectConstraint, TextBlob, Vertices,
};

/// Snapshot of the playback state inside the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StateSnapshot {
    /// Current transform.
    pub matrix: Affine,
    /// Accumulated Z translation.
    pub z: f64,
    /// Number of open saves, layers included.
    pub save_depth: u32,
    /// Number of open layers.
    pub layer_depth: u32,
    /// Number of clips applied since the outermost save.
    pub clip_count: u32,
}

impl Default for StateSnapshot {
    fn default() -> Self {
        Self {
            matrix: Affine::IDENTITY,
            z: 0.0,
            save_depth: 0,
            layer_depth: 0,
            clip_count: 0,
        }
    }
}

/// Event recorded by the reference canvas.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// State operation and the resulting state snapshot.
    State {
        /// Kind of the state operation.
        kind: OpKind,
        /// Snapshot after applying the operation.
        state: StateSnapshot,
    },
    /// Draw operation and the state snapshot used for drawing.
    Draw {
        /// Kind of the draw operation.
        kind: OpKind,
        /// Snapshot at the time of drawing.
        state: StateSnapshot,
        /// Paint the draw was issued with, if any.
        paint: Option<Paint>,
        /// Local-space bounds of the geometry, when they are known.
        bounds: Option<Rect>,
    },
}

impl Event {
    /// Kind of the operation that produced this event.
    pub fn kind(&self) -> OpKind {
        match self {
            Self::State { kind, .. } | Self::Draw { kind, .. } => *kind,
        }
    }

    /// State snapshot carried by this event.
    pub fn state(&self) -> &StateSnapshot {
        match self {
            Self::State { state, .. } | Self::Draw { state, .. } => state,
        }
    }
}

/// Error returned by [`RefCanvas::check_balanced`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NestingError {
    /// Saves and layers still open when the check ran.
    pub unmatched_saves: u32,
    /// Restores issued with nothing left to restore.
    pub underflows: u32,
}

impl fmt::Display for NestingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unbalanced save/restore: {} unmatched saves, {} restore underflows",
            self.unmatched_saves, self.underflows
        )
    }
}

impl core::error::Error for NestingError {}

#[derive(Clone, Copy, Debug)]
struct Frame {
    matrix: Affine,
    z: f64,
    clip_count: u32,
    layer: bool,
}

/// Simple reference implementation of [`Canvas`].
///
/// This canvas:
/// - Tracks the matrix, Z offset, save/layer stack and active clip count,
/// - Records an [`Event`] for every call, in the order it was made,
/// - Expands pictures and drawables in place, so their content is traced too,
/// - Counts restores that have nothing to restore instead of panicking.
#[derive(Debug, Default)]
pub struct RefCanvas {
    /// Log of events in the order they were applied.
    events: Vec<Event>,
    /// Current playback state.
    state: StateSnapshot,
    saves: SmallVec<[Frame; 8]>,
    /// Saves below this depth belong to an enclosing picture.
    floor: usize,
    underflows: u32,
}

impl RefCanvas {
    /// Creates a canvas with identity state and an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a slice of recorded events.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Iterates over the draw events only.
    pub fn draws(&self) -> impl Iterator<Item = &Event> + '_ {
        self.events.iter().filter(|e| matches!(e, Event::Draw { .. }))
    }

    /// Current playback state.
    pub fn state(&self) -> &StateSnapshot {
        &self.state
    }

    /// Clears recorded events but keeps the current state.
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Checks that every save was restored and no restore underflowed.
    pub fn check_balanced(&self) -> Result<(), NestingError> {
        let err = NestingError {
            unmatched_saves: self.state.save_depth,
            underflows: self.underflows,
        };
        if err.unmatched_saves == 0 && err.underflows == 0 {
            Ok(())
        } else {
            Err(err)
        }
    }

    fn push_state(&mut self, kind: OpKind) {
        self.events.push(Event::State {
            kind,
            state: self.state,
        });
    }

    fn push_draw(&mut self, kind: OpKind, paint: Option<&Paint>, bounds: Option<Rect>) {
        self.events.push(Event::Draw {
            kind,
            state: self.state,
            paint: paint.copied(),
            bounds,
        });
    }

    fn push_frame(&mut self, layer: bool) {
        self.saves.push(Frame {
            matrix: self.state.matrix,
            z: self.state.z,
            clip_count: self.state.clip_count,
            layer,
        });
        self.sync_depths();
    }

    fn sync_depths(&mut self) {
        self.state.save_depth =
            u32::try_from(self.saves.len()).expect("RefCanvas: too many saves for u32");
        let layers = self.saves.iter().filter(|f| f.layer).count();
        self.state.layer_depth =
            u32::try_from(layers).expect("RefCanvas: too many layers for u32");
    }

    fn clip(&mut self, kind: OpKind) {
        self.state.clip_count += 1;
        self.push_state(kind);
    }

    /// Plays nested content with `matrix` applied, then restores the
    /// enclosing state whatever the content left open.
    fn nested(&mut self, matrix: Option<&Affine>, content: &Picture) {
        let saved = self.state;
        let depth = self.saves.len();
        let floor = core::mem::replace(&mut self.floor, depth);
        if let Some(m) = matrix {
            self.state.matrix = self.state.matrix * *m;
        }
        content.playback(self);
        self.saves.truncate(depth);
        self.floor = floor;
        self.state = saved;
    }
}

fn points_bounds(points: impl IntoIterator<Item = Point>) -> Option<Rect> {
    let mut points = points.into_iter();
    let first = points.next()?;
    Some(points.fold(Rect::from_points(first, first), |acc, p| acc.union_pt(p)))
}

fn region_bounds(region: &Region) -> Option<Rect> {
    (!region.is_empty()).then(|| region.bounds().to_rect())
}

impl Canvas for RefCanvas {
    fn flush(&mut self) {
        self.push_state(OpKind::Flush);
    }

    fn save(&mut self) {
        self.push_frame(false);
        self.push_state(OpKind::Save);
    }

    fn restore(&mut self) {
        if self.saves.len() > self.floor {
            if let Some(frame) = self.saves.pop() {
                self.state.matrix = frame.matrix;
                self.state.z = frame.z;
                self.state.clip_count = frame.clip_count;
                self.sync_depths();
            }
        } else {
            self.underflows += 1;
        }
        self.push_state(OpKind::Restore);
    }

    fn save_layer(&mut self, rec: &SaveLayerRec<'_>) {
        self.push_frame(true);
        self.events.push(Event::Draw {
            kind: OpKind::SaveLayer,
            state: self.state,
            paint: rec.paint,
            bounds: rec.bounds,
        });
    }

    fn concat(&mut self, matrix: &Affine) {
        self.state.matrix = self.state.matrix * *matrix;
        self.push_state(OpKind::Concat);
    }

    fn set_matrix(&mut self, matrix: &Affine) {
        self.state.matrix = *matrix;
        self.push_state(OpKind::SetMatrix);
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.state.matrix = self.state.matrix * Affine::translate(Vec2::new(dx, dy));
        self.push_state(OpKind::Translate);
    }

    fn translate_z(&mut self, dz: f64) {
        self.state.z += dz;
        self.push_state(OpKind::TranslateZ);
    }

    fn clip_path(&mut self, _path: &BezPath, _op: ClipOp, _anti_alias: bool) {
        self.clip(OpKind::ClipPath);
    }

    fn clip_rect(&mut self, _rect: &Rect, _op: ClipOp, _anti_alias: bool) {
        self.clip(OpKind::ClipRect);
    }

    fn clip_rrect(&mut self, _rrect: &RoundedRect, _op: ClipOp, _anti_alias: bool) {
        self.clip(OpKind::ClipRRect);
    }

    fn clip_region(&mut self, _region: &Region, _op: ClipOp) {
        self.clip(OpKind::ClipRegion);
    }

    fn draw_paint(&mut self, paint: &Paint) {
        self.push_draw(OpKind::DrawPaint, Some(paint), None);
    }

    fn draw_path(&mut self, path: &BezPath, paint: &Paint) {
        self.push_draw(OpKind::DrawPath, Some(paint), Some(path.bounding_box()));
    }

    fn draw_rect(&mut self, rect: &Rect, paint: &Paint) {
        self.push_draw(OpKind::DrawRect, Some(paint), Some(*rect));
    }

    fn draw_region(&mut self, region: &Region, paint: &Paint) {
        self.push_draw(OpKind::DrawRegion, Some(paint), region_bounds(region));
    }

    fn draw_oval(&mut self, oval: &Rect, paint: &Paint) {
        self.push_draw(OpKind::DrawOval, Some(paint), Some(*oval));
    }

    fn draw_arc(
        &mut self,
        oval: &Rect,
        _start_angle: f64,
        _sweep_angle: f64,
        _use_center: bool,
        paint: &Paint,
    ) {
        self.push_draw(OpKind::DrawArc, Some(paint), Some(*oval));
    }

    fn draw_rrect(&mut self, rrect: &RoundedRect, paint: &Paint) {
        self.push_draw(OpKind::DrawRRect, Some(paint), Some(rrect.rect()));
    }

    fn draw_drrect(&mut self, outer: &RoundedRect, _inner: &RoundedRect, paint: &Paint) {
        self.push_draw(OpKind::DrawDRRect, Some(paint), Some(outer.rect()));
    }

    fn draw_annotation(&mut self, rect: &Rect, _key: &str, _value: Option<&[u8]>) {
        self.push_draw(OpKind::DrawAnnotation, None, Some(*rect));
    }

    fn draw_drawable(&mut self, drawable: &Arc<dyn Drawable>, matrix: Option<&Affine>) {
        self.push_draw(OpKind::DrawDrawable, None, Some(drawable.bounds()));
        let snapshot = drawable.snapshot();
        self.nested(matrix, &snapshot);
    }

    fn draw_picture(
        &mut self,
        picture: &Arc<Picture>,
        matrix: Option<&Affine>,
        paint: Option<&Paint>,
    ) {
        self.push_draw(OpKind::DrawPicture, paint, Some(picture.cull()));
        self.nested(matrix, picture);
    }

    fn draw_text(&mut self, _text: &[u8], _x: f64, _y: f64, paint: &Paint) {
        self.push_draw(OpKind::DrawText, Some(paint), None);
    }

    fn draw_pos_text(&mut self, _text: &[u8], pos: Array<'_, Point>, paint: &Paint) {
        self.push_draw(OpKind::DrawPosText, Some(paint), points_bounds(pos));
    }

    fn draw_pos_text_h(
        &mut self,
        _text: &[u8],
        _xpos: Array<'_, f64>,
        _const_y: f64,
        paint: &Paint,
    ) {
        self.push_draw(OpKind::DrawPosTextH, Some(paint), None);
    }

    fn draw_text_rsxform(
        &mut self,
        _text: &[u8],
        _xforms: Array<'_, RsXform>,
        cull: Option<&Rect>,
        paint: &Paint,
    ) {
        self.push_draw(OpKind::DrawTextRSXform, Some(paint), cull.copied());
    }

    fn draw_text_blob(&mut self, blob: &Arc<TextBlob>, x: f64, y: f64, paint: &Paint) {
        let bounds = blob.bounds + Vec2::new(x, y);
        self.push_draw(OpKind::DrawTextBlob, Some(paint), Some(bounds));
    }

    fn draw_image(&mut self, image: &Arc<Image>, x: f64, y: f64, paint: Option<&Paint>) {
        let bounds = image.bounds() + Vec2::new(x, y);
        self.push_draw(OpKind::DrawImage, paint, Some(bounds));
    }

    fn draw_image_nine(
        &mut self,
        _image: &Arc<Image>,
        _center: &IRect,
        dst: &Rect,
        paint: Option<&Paint>,
    ) {
        self.push_draw(OpKind::DrawImageNine, paint, Some(*dst));
    }

    fn draw_image_rect(
        &mut self,
        _image: &Arc<Image>,
        _src: Option<&Rect>,
        dst: &Rect,
        paint: Option<&Paint>,
        _constraint: SrcRectConstraint,
    ) {
        self.push_draw(OpKind::DrawImageRect, paint, Some(*dst));
    }

    fn draw_image_lattice(
        &mut self,
        _image: &Arc<Image>,
        _lattice: &Lattice<'_>,
        dst: &Rect,
        paint: Option<&Paint>,
    ) {
        self.push_draw(OpKind::DrawImageLattice, paint, Some(*dst));
    }

    fn draw_patch(
        &mut self,
        cubics: &[Point; 12],
        _colors: Option<&[Color; 4]>,
        _tex_coords: Option<&[Point; 4]>,
        _mode: BlendMode,
        paint: &Paint,
    ) {
        self.push_draw(OpKind::DrawPatch, Some(paint), points_bounds(cubics.iter().copied()));
    }

    fn draw_points(&mut self, _mode: PointMode, points: Array<'_, Point>, paint: &Paint) {
        self.push_draw(OpKind::DrawPoints, Some(paint), points_bounds(points));
    }

    fn draw_vertices(&mut self, vertices: &Arc<Vertices>, _mode: BlendMode, paint: &Paint) {
        self.push_draw(OpKind::DrawVertices, Some(paint), Some(vertices.bounds()));
    }

    fn draw_atlas(
        &mut self,
        _atlas: &Arc<Image>,
        _xforms: Array<'_, RsXform>,
        _tex: Array<'_, Rect>,
        _colors: Option<Array<'_, Color>>,
        _mode: BlendMode,
        cull: Option<&Rect>,
        paint: Option<&Paint>,
    ) {
        self.push_draw(OpKind::DrawAtlas, paint, cull.copied());
    }

    fn draw_shadow_rec(&mut self, path: &BezPath, _rec: &ShadowRec) {
        self.push_draw(OpKind::DrawShadowRec, None, Some(path.bounding_box()));
    }
}
