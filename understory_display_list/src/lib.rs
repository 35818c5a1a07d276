// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Display List: deferred recording and playback of drawing commands.
//!
//! A [`RecordingCanvas`] captures drawing calls without executing them and
//! packs each one into a compact, type-tagged record inside a
//! [`DisplayListData`]. The buffer can later be replayed any number of times
//! against any [`Canvas`] implementation, or rewritten in place by a
//! [`ColorTransform`].
//!
//! - **Operation catalog** ([`OpKind`], [`Op`]): the closed set of operation
//!   kinds. Encoding, decoding, dispatch and the color walk are all generated
//!   from one list, so they cannot drift apart.
//! - **Encoded buffer** ([`DisplayListData`]): back-to-back records, each with
//!   a 4-byte header holding its kind and length, so traversal can skip
//!   records without decoding them. Shared handles (images, blobs, pictures,
//!   drawables) are owned by the buffer.
//! - **Recording** ([`RecordingCanvas`]): a [`Canvas`] that appends a record
//!   per call. It tracks no matrix or clip state.
//! - **Playback** ([`DisplayListData::draw`], [`DisplayListData::draw_traced`],
//!   [`DisplayListData::apply_color_transform`]).
//!
//! ## Example
//!
//! ```rust
//! use kurbo::Rect;
//! use peniko::Color;
//! use understory_display_list::{
//!     Canvas, DisplayListData, IRect, InvertColors, OpKind, Paint, RecordingCanvas,
//! };
//!
//! let mut dl = DisplayListData::new();
//! let mut canvas = RecordingCanvas::new(&mut dl, IRect::from_size(200, 200));
//! let paint = Paint::new(Color::BLACK);
//! let rect = Rect::new(0.0, 0.0, 50.0, 50.0);
//!
//! canvas.save();
//! canvas.draw_rect(&rect, &paint);
//! canvas.translate(10.0, 10.0);
//! canvas.draw_rect(&rect, &paint);
//! canvas.restore();
//!
//! let kinds: Vec<_> = dl.records().map(|r| r.kind).collect();
//! assert_eq!(
//!     kinds,
//!     [OpKind::Save, OpKind::DrawRect, OpKind::Translate, OpKind::DrawRect, OpKind::Restore]
//! );
//!
//! // Rewrite every recorded color in place; geometry is untouched.
//! let used = dl.used();
//! dl.apply_color_transform(&InvertColors);
//! assert_eq!(dl.used(), used);
//! ```
//!
//! ## Features
//!
//! - `std` (default): forwards to `kurbo/std` and `peniko/std`.
//! - `libm`: floating point support for `no_std` builds.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod canvas;
mod catalog;
mod codec;
mod color;
mod data;
pub mod ops;
mod picture;
mod recording;
pub mod trace;
mod values;

pub use canvas::{Canvas, NoDrawCanvas};
pub use catalog::{Op, OpKind, UnknownOpKind};
pub use codec::{Array, ArrayIter, Field};
pub use color::{ColorTransform, Compose, InvertColors, MultiplyAlpha};
pub use data::{
    DisplayListData, HEADER_SIZE, MAX_RECORD_LEN, MIN_RESERVE, Ops, RecordHeader, Records,
};
pub use picture::{Drawable, Picture};
pub use recording::RecordingCanvas;
pub use trace::{KindStats, OpHistogram, PlaybackTrace};
pub use values::{
    BlendMode, ClipOp, IRect, Image, ImageFilter, Lattice, LatticeRectType, Paint, PaintStyle,
    PointMode, Region, RsXform, SaveLayerFlags, SaveLayerRec, ShadowFlags, ShadowRec,
    SrcRectConstraint, TextBlob, VertexMode, Vertices,
};
