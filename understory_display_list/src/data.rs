// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The encoded buffer.

use alloc::vec::Vec;
use core::fmt;

use peniko::Color;

use crate::canvas::Canvas;
use crate::catalog::{Op, OpKind};
use crate::codec::{ColorCursor, Field, Reader, Resource, Writer, count32};
use crate::color::ColorTransform;
use crate::trace::PlaybackTrace;

/// Size of a record header in bytes.
pub const HEADER_SIZE: usize = 4;

/// Largest record length representable in a header.
pub const MAX_RECORD_LEN: usize = (1 << 24) - 1;

/// Capacity reserved by the first growth of an empty buffer.
pub const MIN_RESERVE: usize = 256;

const ALIGN: usize = 4;

/// Position and size of one record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordHeader {
    /// Byte offset of the header.
    pub offset: usize,
    /// Operation kind.
    pub kind: OpKind,
    /// Length of the whole record, header and padding included.
    pub len: usize,
}

impl RecordHeader {
    /// Offset of the next record.
    pub const fn end(&self) -> usize {
        self.offset + self.len
    }

    fn payload(&self) -> core::ops::Range<usize> {
        self.offset + HEADER_SIZE..self.end()
    }
}

/// An append-only sequence of encoded drawing records.
///
/// Each record is a 4-byte little-endian header (kind in the low byte, total
/// record length in the upper 24 bits) followed by the payload, padded to a
/// 4-byte boundary. The header length is always the distance to the next
/// record, so the buffer can be walked without decoding payloads.
///
/// Shared handles referenced by records (images, blobs, pictures, drawables,
/// filters, vertices) are owned by the buffer: they are released when the
/// buffer is reset or dropped, in record order.
///
/// Recording goes through [`RecordingCanvas`](crate::RecordingCanvas);
/// playback through [`draw`](Self::draw).
#[derive(Default)]
pub struct DisplayListData {
    // Dropped before `bytes`.
    slots: Vec<Resource>,
    bytes: Vec<u8>,
    reserved: usize,
    reallocations: usize,
}

// A clone allocates the full reservation up front, so `reserved` stays the
// real capacity and growth on the copy is counted from zero.
impl Clone for DisplayListData {
    fn clone(&self) -> Self {
        let mut bytes = Vec::with_capacity(self.reserved);
        bytes.extend_from_slice(&self.bytes);
        Self {
            slots: self.slots.clone(),
            bytes,
            reserved: self.reserved,
            reallocations: 0,
        }
    }
}

impl fmt::Debug for DisplayListData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisplayListData")
            .field("used", &self.used())
            .field("reserved", &self.reserved)
            .field("reallocations", &self.reallocations)
            .field("ops", &self.op_count())
            .field("slots", &self.slots.len())
            .finish_non_exhaustive()
    }
}

impl DisplayListData {
    /// Creates an empty buffer. Nothing is allocated until the first record.
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            bytes: Vec::new(),
            reserved: 0,
            reallocations: 0,
        }
    }

    /// Creates an empty buffer with `capacity` bytes reserved.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            bytes: Vec::with_capacity(capacity),
            reserved: capacity,
            reallocations: 0,
        }
    }

    /// Returns `true` if no records have been recorded.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Bytes occupied by records.
    pub fn used(&self) -> usize {
        self.bytes.len()
    }

    /// Bytes reserved for records.
    pub fn reserved(&self) -> usize {
        self.reserved
    }

    /// Number of times the storage has grown since the buffer was created,
    /// cloned or last [`reset`](Self::reset).
    pub fn reallocations(&self) -> usize {
        self.reallocations
    }

    /// The encoded records.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of records.
    pub fn op_count(&self) -> usize {
        self.records().count()
    }

    /// Appends one record and returns the byte offset of its payload.
    ///
    /// The payload is measured before anything is written, so the buffer
    /// grows at most once per record. Growth doubles the reservation.
    ///
    /// # Panics
    ///
    /// Panics if the record does not fit in a 24-bit length.
    pub fn push<'o>(&mut self, op: impl Into<Op<'o>>) -> usize {
        let op = op.into();
        let kind = op.kind();

        let mut measure = Writer::measure();
        op.encode(&mut measure);
        let payload = measure.len();
        let len = (HEADER_SIZE + payload).next_multiple_of(ALIGN);
        assert!(
            len <= MAX_RECORD_LEN,
            "display list: {kind} record of {len} bytes exceeds the 24-bit record length"
        );

        self.grow_for(len);
        let offset = self.bytes.len();
        let header = u32::from(kind.tag()) | (count32(len) << 8);
        self.bytes.extend_from_slice(&header.to_le_bytes());

        let mut writer = Writer::new(&mut self.bytes, &mut self.slots);
        op.encode(&mut writer);
        let written = writer.len();
        assert_eq!(
            written, payload,
            "display list: {kind} payload wrote {written} bytes but measured {payload}"
        );
        self.bytes.resize(offset + len, 0);
        offset + HEADER_SIZE
    }

    fn grow_for(&mut self, len: usize) {
        let needed = self.bytes.len() + len;
        if needed <= self.reserved {
            return;
        }
        let mut reserved = self.reserved.max(MIN_RESERVE);
        while reserved < needed {
            reserved *= 2;
        }
        self.bytes.reserve_exact(reserved - self.bytes.len());
        self.reserved = reserved;
        self.reallocations += 1;
    }

    /// Iterates record headers using only the stored lengths.
    pub fn records(&self) -> Records<'_> {
        Records {
            bytes: &self.bytes,
            offset: 0,
        }
    }

    /// Iterates decoded operations in stream order.
    pub fn iter(&self) -> Ops<'_> {
        Ops {
            data: self,
            records: self.records(),
        }
    }

    /// Decodes the record described by `header`.
    ///
    /// # Panics
    ///
    /// Panics if `header` does not describe a record of this buffer.
    pub fn decode(&self, header: &RecordHeader) -> Op<'_> {
        let mut reader = Reader::new(&self.bytes[header.payload()], &self.slots);
        Op::decode(header.kind, &mut reader)
    }

    /// Replays every record onto `canvas`, in stream order.
    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        for op in self.iter() {
            op.replay(canvas);
        }
    }

    /// Like [`draw`](Self::draw), reporting each record to `trace` before it
    /// is dispatched.
    pub fn draw_traced<C, T>(&self, canvas: &mut C, trace: &mut T)
    where
        C: Canvas + ?Sized,
        T: PlaybackTrace + ?Sized,
    {
        for header in self.records() {
            trace.record(&header);
            self.decode(&header).replay(canvas);
        }
    }

    /// Rewrites every paint and color field in place with `transform`.
    ///
    /// Geometry, counts and record boundaries are left untouched. Colors
    /// inside shared handles are not rewritten.
    pub fn apply_color_transform<T: ColorTransform + ?Sized>(&mut self, transform: &T) {
        let mut f = |color: Color| transform.transform(color);
        let mut offset = 0;
        while offset < self.bytes.len() {
            let header = read_header(&self.bytes, offset);
            let mut cursor = ColorCursor::new(&mut self.bytes[header.payload()]);
            Op::map_colors(header.kind, &mut cursor, &mut f);
            offset = header.end();
        }
    }

    /// Releases every record and its handles, keeping the reservation.
    ///
    /// Handles are released in record order before the bytes are cleared.
    /// The growth counter starts over.
    pub fn reset(&mut self) {
        self.slots.clear();
        self.bytes.clear();
        self.reallocations = 0;
    }
}

impl<'a> IntoIterator for &'a DisplayListData {
    type Item = Op<'a>;
    type IntoIter = Ops<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn read_header(bytes: &[u8], offset: usize) -> RecordHeader {
    let raw = u32::load(&bytes[offset..offset + HEADER_SIZE]);
    let tag = raw.to_le_bytes()[0];
    let kind = match OpKind::try_from(tag) {
        Ok(kind) => kind,
        Err(err) => panic!("display list: {err} at offset {offset}"),
    };
    let len = (raw >> 8) as usize;
    assert!(
        len >= HEADER_SIZE && offset + len <= bytes.len(),
        "display list: {kind} record at offset {offset} has invalid length {len}"
    );
    RecordHeader { offset, kind, len }
}

/// Iterator over record headers, driven only by the stored skip distances.
#[derive(Clone, Debug)]
pub struct Records<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl Iterator for Records<'_> {
    type Item = RecordHeader;

    fn next(&mut self) -> Option<RecordHeader> {
        if self.offset >= self.bytes.len() {
            return None;
        }
        let header = read_header(self.bytes, self.offset);
        self.offset = header.end();
        Some(header)
    }
}

/// Iterator over decoded operations.
#[derive(Clone, Debug)]
pub struct Ops<'a> {
    data: &'a DisplayListData,
    records: Records<'a>,
}

impl<'a> Iterator for Ops<'a> {
    type Item = Op<'a>;

    fn next(&mut self) -> Option<Op<'a>> {
        let header = self.records.next()?;
        Some(self.data.decode(&header))
    }
}

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;
    use alloc::vec;
    use alloc::vec::Vec;

    use kurbo::{BezPath, Rect};

    use super::*;
    use crate::canvas::NoDrawCanvas;
    use crate::ops;
    use crate::values::{Image, Paint};

    fn image() -> Arc<Image> {
        Arc::new(Image::rgba8(1, 1, vec![0, 0, 0, 255]))
    }

    #[test]
    fn growth_doubles_from_initial_capacity() {
        let mut dl = DisplayListData::with_capacity(64);
        for _ in 0..16 {
            dl.push(ops::Save);
        }
        assert_eq!(dl.used(), 64);
        assert_eq!(dl.reallocations(), 0, "16 four-byte records fit in 64 bytes");
        let before = dl.as_bytes().to_vec();

        dl.push(ops::Save);
        assert_eq!((dl.reserved(), dl.reallocations()), (128, 1));
        assert_eq!(&dl.as_bytes()[..64], &before[..], "growth must not disturb records");

        for _ in 17..32 {
            dl.push(ops::Save);
        }
        assert_eq!(dl.reallocations(), 1);
        dl.push(ops::Save);
        assert_eq!((dl.reserved(), dl.reallocations()), (256, 2));
        assert_eq!(dl.op_count(), 33);
    }

    #[test]
    fn first_growth_of_empty_buffer_uses_minimum_reserve() {
        let mut dl = DisplayListData::new();
        assert_eq!(dl.reserved(), 0);
        dl.push(ops::Restore);
        assert_eq!(dl.reserved(), MIN_RESERVE);
        assert_eq!(dl.reallocations(), 1);
    }

    #[test]
    fn records_are_aligned_and_back_to_back() {
        let mut dl = DisplayListData::new();
        dl.push(ops::Save);
        dl.push(ops::DrawText {
            text: b"abc",
            x: 1.0,
            y: 2.0,
            paint: Paint::default(),
        });
        dl.push(ops::Translate { dx: 1.0, dy: 2.0 });
        dl.push(ops::Restore);

        let headers: Vec<_> = dl.records().collect();
        assert_eq!(headers.len(), 4);
        let mut expected = 0;
        for header in &headers {
            assert_eq!(
                header.offset, expected,
                "{} is not where the previous record ends",
                header.kind
            );
            assert_eq!(header.len % 4, 0, "{} is not padded", header.kind);
            expected = header.end();
        }
        assert_eq!(expected, dl.used());
        assert_eq!(headers[1].kind, OpKind::DrawText);
        assert_eq!(headers[2].len, HEADER_SIZE + 16);
    }

    #[test]
    fn push_returns_payload_offset() {
        let mut dl = DisplayListData::new();
        assert_eq!(dl.push(ops::Save), HEADER_SIZE);
        let at = dl.push(ops::TranslateZ { dz: 3.0 });
        assert_eq!(at, 2 * HEADER_SIZE);
        assert_eq!(f64::load(&dl.as_bytes()[at..at + 8]), 3.0);
    }

    #[test]
    fn empty_buffer_reset_and_draw_are_no_ops() {
        let mut dl = DisplayListData::new();
        dl.reset();
        dl.draw(&mut NoDrawCanvas);
        dl.apply_color_transform(&|c: Color| c);
        assert!(dl.is_empty());
        assert_eq!(dl.op_count(), 0);
        assert_eq!(dl.reallocations(), 0);
    }

    #[test]
    fn reset_releases_every_handle_and_keeps_reservation() {
        let image = image();
        let mut dl = DisplayListData::new();
        for _ in 0..2 {
            dl.push(ops::DrawImage {
                image: &image,
                x: 0.0,
                y: 0.0,
                paint: None,
            });
        }
        assert_eq!(Arc::strong_count(&image), 3);
        let reserved = dl.reserved();

        dl.reset();
        assert_eq!(Arc::strong_count(&image), 1, "both records must release their reference");
        assert!(dl.is_empty());
        assert_eq!(dl.reserved(), reserved);
        dl.reset();
    }

    #[test]
    fn reset_restarts_the_growth_count() {
        let mut dl = DisplayListData::new();
        for _ in 0..(MIN_RESERVE / HEADER_SIZE + 1) {
            dl.push(ops::Save);
        }
        assert_eq!((dl.reserved(), dl.reallocations()), (2 * MIN_RESERVE, 2));

        dl.reset();
        assert_eq!(dl.reallocations(), 0);
        for _ in 0..(2 * MIN_RESERVE / HEADER_SIZE) {
            dl.push(ops::Save);
        }
        assert_eq!(dl.reallocations(), 0, "the second pass fits the kept reservation");
        dl.push(ops::Save);
        assert_eq!((dl.reserved(), dl.reallocations()), (4 * MIN_RESERVE, 1));
    }

    #[test]
    fn clones_own_their_reservation() {
        let image = image();
        let mut dl = DisplayListData::with_capacity(1024);
        dl.push(ops::Save);
        dl.push(ops::DrawImage {
            image: &image,
            x: 0.0,
            y: 0.0,
            paint: None,
        });
        dl.push(ops::Restore);
        let used = dl.used();

        let mut copy = dl.clone();
        assert_eq!(copy.as_bytes(), dl.as_bytes());
        assert_eq!(Arc::strong_count(&image), 3, "the copy holds its own reference");
        assert_eq!((copy.reserved(), copy.reallocations()), (1024, 0));
        assert!(copy.bytes.capacity() >= copy.reserved());

        let fill = (1024 - used) / HEADER_SIZE;
        for _ in 0..fill {
            copy.push(ops::Save);
        }
        assert_eq!(copy.reallocations(), 0, "records up to the reservation fit");
        assert!(copy.bytes.capacity() >= copy.reserved());
        copy.push(ops::Save);
        assert_eq!((copy.reserved(), copy.reallocations()), (2048, 1));
        assert!(copy.bytes.capacity() >= copy.reserved());

        drop(copy);
        assert_eq!(Arc::strong_count(&image), 2);
        assert_eq!(dl.used(), used, "the original is untouched");
    }

    #[test]
    fn drop_releases_every_handle() {
        let image = image();
        let mut dl = DisplayListData::new();
        dl.push(ops::DrawImage {
            image: &image,
            x: 0.0,
            y: 0.0,
            paint: None,
        });
        dl.push(ops::DrawImageNine {
            image: &image,
            center: crate::IRect::new(0, 0, 1, 1),
            dst: Rect::new(0.0, 0.0, 10.0, 10.0),
            paint: None,
        });
        assert_eq!(Arc::strong_count(&image), 3);
        drop(dl);
        assert_eq!(Arc::strong_count(&image), 1);
    }

    #[test]
    fn decoded_handles_point_at_the_recorded_object() {
        let image = image();
        let mut dl = DisplayListData::new();
        dl.push(ops::DrawImage {
            image: &image,
            x: 4.0,
            y: 5.0,
            paint: Some(Paint::new(Color::WHITE)),
        });
        match dl.iter().next() {
            Some(Op::DrawImage(op)) => {
                assert!(Arc::ptr_eq(op.image, &image));
                assert_eq!((op.x, op.y), (4.0, 5.0));
                assert_eq!(op.paint, Some(Paint::new(Color::WHITE)));
            }
            other => panic!("unexpected op {other:?}"),
        }
    }

    #[test]
    #[should_panic(expected = "unknown display list operation tag")]
    fn unknown_tag_is_fatal() {
        let mut bytes = vec![0_u8; 4];
        (200_u32 | (4 << 8)).store(&mut bytes);
        let _ = read_header(&bytes, 0);
    }

    #[test]
    #[should_panic(expected = "invalid length")]
    fn truncated_record_is_fatal() {
        let mut bytes = vec![0_u8; 4];
        (u32::from(OpKind::Save.tag()) | (64 << 8)).store(&mut bytes);
        let _ = read_header(&bytes, 0);
    }

    #[test]
    fn path_records_grow_with_their_bodies() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((1.0, 1.0));
        let mut dl = DisplayListData::new();
        dl.push(ops::DrawPath {
            path: alloc::borrow::Cow::Borrowed(&path),
            paint: Paint::default(),
        });
        let header = dl.records().next().unwrap();
        // Header, two counts, paint, two verbs, two points, padding.
        assert_eq!(header.len, (4 + 8 + Paint::SIZE + 2 + 32).next_multiple_of(4));
    }
}
