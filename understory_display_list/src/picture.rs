// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recorded pictures and deferred drawables.

use alloc::sync::Arc;
use core::fmt;

use kurbo::Rect;

use crate::canvas::Canvas;
use crate::data::DisplayListData;
use crate::recording::RecordingCanvas;
use crate::values::IRect;

/// An immutable recording with a cull rectangle.
///
/// Pictures are shared by [`Arc`] and can be drawn into other recordings,
/// which keep them alive for as long as the referencing record exists.
#[derive(Clone, Debug, Default)]
pub struct Picture {
    cull: Rect,
    data: DisplayListData,
}

impl Picture {
    /// Wraps an existing recording.
    pub fn new(cull: Rect, data: DisplayListData) -> Self {
        Self { cull, data }
    }

    /// Records a picture by running `f` against a fresh session whose bounds
    /// cover `cull`.
    pub fn record(cull: Rect, f: impl FnOnce(&mut RecordingCanvas<'_>)) -> Self {
        let mut data = DisplayListData::new();
        let mut canvas = RecordingCanvas::new(&mut data, IRect::round_out(cull));
        f(&mut canvas);
        Self { cull, data }
    }

    /// Conservative bounds of everything the picture draws.
    pub fn cull(&self) -> Rect {
        self.cull
    }

    /// The recorded operations.
    pub fn data(&self) -> &DisplayListData {
        &self.data
    }

    /// Replays the picture onto `canvas`.
    pub fn playback<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        self.data.draw(canvas);
    }
}

/// Content that is produced lazily, when a recording is played back.
///
/// A drawable stays owned by every record that references it; playback asks it
/// for a fresh snapshot each time.
pub trait Drawable: fmt::Debug + Send + Sync {
    /// Conservative bounds of the content.
    fn bounds(&self) -> Rect;

    /// Records the current content.
    fn snapshot(&self) -> Arc<Picture>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::OpKind;
    use crate::values::Paint;
    use peniko::Color;

    #[test]
    fn record_uses_cull_as_bounds() {
        let picture = Picture::record(Rect::new(0.0, 0.0, 20.0, 10.0), |canvas| {
            assert_eq!(canvas.bounds(), IRect::new(0, 0, 20, 10));
            canvas.draw_paint(&Paint::new(Color::WHITE));
        });
        let kinds: alloc::vec::Vec<_> = picture.data().records().map(|r| r.kind).collect();
        assert_eq!(kinds, [OpKind::DrawPaint]);
        assert_eq!(picture.cull(), Rect::new(0.0, 0.0, 20.0, 10.0));
    }

    #[test]
    fn empty_cull_drops_draws() {
        let picture = Picture::record(Rect::ZERO, |canvas| {
            canvas.save();
            canvas.draw_paint(&Paint::default());
            canvas.restore();
        });
        assert_eq!(picture.data().op_count(), 2);
    }
}
