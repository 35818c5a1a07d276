// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The operation catalog.
//!
//! `for_each_op!` is the only list of operation kinds. Everything that
//! switches on a kind ([`OpKind`], the [`Op`] union, encoding, decoding,
//! replay and the color walk) is generated from it, so adding a kind without
//! teaching every table about it does not compile.

use core::fmt;

use peniko::Color;

use crate::canvas::Canvas;
use crate::codec::{ColorCursor, Reader, Writer};
use crate::ops::{self, Record};

/// Invokes `$callback!` with the ordered catalog.
///
/// The lifetime is passed through so that generated items can name borrowed
/// payloads without running into macro hygiene.
macro_rules! for_each_op {
    ($callback:ident) => {
        $callback! {
            'a;
            /// Flush pending work to the backend.
            Flush,
            /// Push the matrix and clip.
            Save,
            /// Pop the matrix and clip.
            Restore,
            /// Push a layer along with the matrix and clip.
            SaveLayer<'a>,
            /// Pre-multiply the matrix.
            Concat,
            /// Replace the matrix.
            SetMatrix,
            /// Pre-translate the matrix.
            Translate,
            /// Move along the Z axis.
            TranslateZ,
            /// Clip to a path.
            ClipPath<'a>,
            /// Clip to a rectangle.
            ClipRect,
            /// Clip to a rounded rectangle.
            ClipRRect,
            /// Clip to a region.
            ClipRegion<'a>,
            /// Fill the clip with a paint.
            DrawPaint,
            /// Draw a path.
            DrawPath<'a>,
            /// Draw a rectangle.
            DrawRect,
            /// Draw a region.
            DrawRegion<'a>,
            /// Draw an oval.
            DrawOval,
            /// Draw an arc of an oval.
            DrawArc,
            /// Draw a rounded rectangle.
            DrawRRect,
            /// Draw the area between two rounded rectangles.
            DrawDRRect,
            /// Attach a key/value annotation to an area.
            DrawAnnotation<'a>,
            /// Draw a drawable.
            DrawDrawable<'a>,
            /// Draw a recorded picture.
            DrawPicture<'a>,
            /// Draw text at an origin.
            DrawText<'a>,
            /// Draw text with one position per glyph.
            DrawPosText<'a>,
            /// Draw text with one X position per glyph on a shared baseline.
            DrawPosTextH<'a>,
            /// Draw text with one transform per glyph.
            DrawTextRSXform<'a>,
            /// Draw a text blob.
            DrawTextBlob<'a>,
            /// Draw an image at an origin.
            DrawImage<'a>,
            /// Draw an image stretched as a nine-patch.
            DrawImageNine<'a>,
            /// Draw part of an image into a rectangle.
            DrawImageRect<'a>,
            /// Draw an image stretched through a lattice.
            DrawImageLattice<'a>,
            /// Draw a Coons patch.
            DrawPatch,
            /// Draw a list of points.
            DrawPoints<'a>,
            /// Draw a triangle mesh.
            DrawVertices<'a>,
            /// Draw sprites from an atlas image.
            DrawAtlas<'a>,
            /// Draw an elevation shadow.
            DrawShadowRec<'a>,
        }
    };
}

macro_rules! declare_catalog {
    (
        $lt:lifetime;
        $($(#[$doc:meta])* $kind:ident $(<$l:lifetime>)?,)*
    ) => {
        /// Identifies one operation kind.
        ///
        /// The discriminant is the tag stored in record headers. It is only
        /// stable within one build.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(u8)]
        pub enum OpKind {
            $($(#[$doc])* $kind,)*
        }

        impl OpKind {
            /// Number of kinds in the catalog.
            pub const COUNT: usize = [$(stringify!($kind)),*].len();

            /// Every kind, in tag order.
            pub const ALL: [Self; Self::COUNT] = [$(Self::$kind),*];

            /// The kind's name.
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$kind => stringify!($kind),)*
                }
            }

            /// The tag stored in record headers.
            pub const fn tag(self) -> u8 {
                self as u8
            }
        }

        /// A decoded operation, borrowing from the buffer it came from (or
        /// from the arguments it will be recorded from).
        #[derive(Clone, Debug)]
        #[expect(missing_docs, reason = "each variant wraps the payload named after it")]
        pub enum Op<$lt> {
            $($kind(ops::$kind $(<$l>)?),)*
        }

        impl<$lt> Op<$lt> {
            /// The kind of this operation.
            pub fn kind(&self) -> OpKind {
                match self {
                    $(Self::$kind(_) => OpKind::$kind,)*
                }
            }

            /// Dispatch this operation to the matching `canvas` method.
            pub fn replay<C: Canvas + ?Sized>(&self, canvas: &mut C) {
                match self {
                    $(Self::$kind(op) => op.replay(canvas),)*
                }
            }

            pub(crate) fn encode(&self, writer: &mut Writer<'_>) {
                match self {
                    $(Self::$kind(op) => op.encode(writer),)*
                }
            }

            pub(crate) fn decode(kind: OpKind, reader: &mut Reader<$lt>) -> Self {
                match kind {
                    $(OpKind::$kind => Self::$kind(Record::decode(reader)),)*
                }
            }

            pub(crate) fn map_colors(
                kind: OpKind,
                cursor: &mut ColorCursor<'_>,
                f: &mut dyn FnMut(Color) -> Color,
            ) {
                match kind {
                    $(OpKind::$kind => {
                        <ops::$kind $(<$l>)? as Record<$lt>>::map_colors(cursor, f);
                    })*
                }
            }
        }

        $(
            impl<$lt> From<ops::$kind $(<$l>)?> for Op<$lt> {
                fn from(op: ops::$kind $(<$l>)?) -> Self {
                    Self::$kind(op)
                }
            }
        )*
    };
}

for_each_op!(declare_catalog);

impl TryFrom<u8> for OpKind {
    type Error = UnknownOpKind;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(usize::from(tag))
            .copied()
            .ok_or(UnknownOpKind(tag))
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A record tag that does not name any catalog entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnknownOpKind(pub u8);

impl fmt::Display for UnknownOpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown display list operation tag {}", self.0)
    }
}

impl core::error::Error for UnknownOpKind {}
