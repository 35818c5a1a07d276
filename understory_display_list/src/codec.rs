// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Little-endian field codec used inside display-list records.
//!
//! Every value stored in a record payload implements [`Field`]: a fixed-size,
//! copyable value with an explicit little-endian encoding. Variable-length
//! arguments are stored as trailing runs of fields and surface as [`Array`]
//! views, which decode lazily so playback never allocates for them.
//!
//! Shared handles are not encoded as bytes at all. They are moved into the
//! owning buffer's slot table and the payload stores the slot index.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::marker::PhantomData;

use kurbo::{Affine, BezPath, Cap, Join, PathEl, Point, Rect, RoundedRect, RoundedRectRadii};
use peniko::Color;

use crate::picture::{Drawable, Picture};
use crate::values::{
    BlendMode, ClipOp, IRect, Image, ImageFilter, LatticeRectType, Paint, PaintStyle, PointMode,
    RsXform, SaveLayerFlags, ShadowFlags, ShadowRec, SrcRectConstraint, TextBlob, VertexMode,
    Vertices,
};

/// A fixed-size value that can be stored in a display-list record.
///
/// Implementations must write and read exactly [`Field::SIZE`] bytes.
pub trait Field: Copy {
    /// Encoded size in bytes.
    const SIZE: usize;

    /// Write the encoding of `self` into `out`, which is exactly `SIZE` bytes long.
    fn store(&self, out: &mut [u8]);

    /// Read a value from `bytes`, which is exactly `SIZE` bytes long.
    fn load(bytes: &[u8]) -> Self;
}

macro_rules! le_field {
    ($($ty:ty),* $(,)?) => {$(
        impl Field for $ty {
            const SIZE: usize = size_of::<$ty>();

            #[inline]
            fn store(&self, out: &mut [u8]) {
                out.copy_from_slice(&self.to_le_bytes());
            }

            #[inline]
            fn load(bytes: &[u8]) -> Self {
                let mut raw = [0_u8; size_of::<$ty>()];
                raw.copy_from_slice(bytes);
                Self::from_le_bytes(raw)
            }
        }
    )*};
}

le_field!(u8, u16, u32, i32, f32, f64);

/// Byte-tagged encoding for fieldless enums.
macro_rules! byte_enum_field {
    ($ty:ty { $($variant:ident = $tag:literal),* $(,)? }) => {
        impl Field for $ty {
            const SIZE: usize = 1;

            #[inline]
            fn store(&self, out: &mut [u8]) {
                out[0] = match self {
                    $(Self::$variant => $tag,)*
                };
            }

            #[inline]
            fn load(bytes: &[u8]) -> Self {
                match bytes[0] {
                    $($tag => Self::$variant,)*
                    tag => panic!(concat!("invalid ", stringify!($ty), " tag {}"), tag),
                }
            }
        }
    };
}

byte_enum_field!(ClipOp { Difference = 0, Intersect = 1 });
byte_enum_field!(PointMode { Points = 0, Lines = 1, Polygon = 2 });
byte_enum_field!(SrcRectConstraint { Strict = 0, Fast = 1 });
byte_enum_field!(PaintStyle { Fill = 0, Stroke = 1, StrokeAndFill = 2 });
byte_enum_field!(LatticeRectType { Default = 0, Transparent = 1, FixedColor = 2 });
byte_enum_field!(VertexMode { Triangles = 0, TriangleStrip = 1, TriangleFan = 2 });
byte_enum_field!(Cap { Butt = 0, Square = 1, Round = 2 });
byte_enum_field!(Join { Bevel = 0, Miter = 1, Round = 2 });
byte_enum_field!(BlendMode {
    Clear = 0,
    Src = 1,
    Dst = 2,
    SrcOver = 3,
    DstOver = 4,
    SrcIn = 5,
    DstIn = 6,
    SrcOut = 7,
    DstOut = 8,
    SrcATop = 9,
    DstATop = 10,
    Xor = 11,
    Plus = 12,
    Modulate = 13,
    Screen = 14,
    Overlay = 15,
    Darken = 16,
    Lighten = 17,
    ColorDodge = 18,
    ColorBurn = 19,
    HardLight = 20,
    SoftLight = 21,
    Difference = 22,
    Exclusion = 23,
    Multiply = 24,
    Hue = 25,
    Saturation = 26,
    Color = 27,
    Luminosity = 28,
});

impl Field for bool {
    const SIZE: usize = 1;

    #[inline]
    fn store(&self, out: &mut [u8]) {
        out[0] = u8::from(*self);
    }

    #[inline]
    fn load(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }
}

/// Sequential writer over a fixed-size field slot.
struct Pack<'a> {
    out: &'a mut [u8],
    pos: usize,
}

impl<'a> Pack<'a> {
    fn new(out: &'a mut [u8]) -> Self {
        Self { out, pos: 0 }
    }

    fn put<T: Field>(&mut self, value: T) {
        let end = self.pos + T::SIZE;
        value.store(&mut self.out[self.pos..end]);
        self.pos = end;
    }
}

/// Sequential reader over a fixed-size field slot.
struct Unpack<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Unpack<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn get<T: Field>(&mut self) -> T {
        let end = self.pos + T::SIZE;
        let value = T::load(&self.bytes[self.pos..end]);
        self.pos = end;
        value
    }
}

impl<T: Field, const N: usize> Field for [T; N] {
    const SIZE: usize = T::SIZE * N;

    fn store(&self, out: &mut [u8]) {
        let mut pack = Pack::new(out);
        for value in self {
            pack.put(*value);
        }
    }

    fn load(bytes: &[u8]) -> Self {
        let mut unpack = Unpack::new(bytes);
        core::array::from_fn(|_| unpack.get())
    }
}

/// Optional values always reserve their slot: a presence byte followed by
/// `T::SIZE` bytes, zeroed when absent.
impl<T: Field> Field for Option<T> {
    const SIZE: usize = 1 + T::SIZE;

    fn store(&self, out: &mut [u8]) {
        match self {
            Some(value) => {
                out[0] = 1;
                value.store(&mut out[1..]);
            }
            None => out.fill(0),
        }
    }

    fn load(bytes: &[u8]) -> Self {
        (bytes[0] != 0).then(|| T::load(&bytes[1..]))
    }
}

impl Field for Point {
    const SIZE: usize = 16;

    fn store(&self, out: &mut [u8]) {
        [self.x, self.y].store(out);
    }

    fn load(bytes: &[u8]) -> Self {
        let [x, y] = <[f64; 2]>::load(bytes);
        Self::new(x, y)
    }
}

impl Field for Rect {
    const SIZE: usize = 32;

    fn store(&self, out: &mut [u8]) {
        [self.x0, self.y0, self.x1, self.y1].store(out);
    }

    fn load(bytes: &[u8]) -> Self {
        let [x0, y0, x1, y1] = <[f64; 4]>::load(bytes);
        Self::new(x0, y0, x1, y1)
    }
}

impl Field for RoundedRect {
    const SIZE: usize = Rect::SIZE + 32;

    fn store(&self, out: &mut [u8]) {
        let radii = self.radii();
        let mut pack = Pack::new(out);
        pack.put(self.rect());
        pack.put([
            radii.top_left,
            radii.top_right,
            radii.bottom_right,
            radii.bottom_left,
        ]);
    }

    fn load(bytes: &[u8]) -> Self {
        let mut unpack = Unpack::new(bytes);
        let rect: Rect = unpack.get();
        let [tl, tr, br, bl] = unpack.get::<[f64; 4]>();
        Self::from_rect(rect, RoundedRectRadii::new(tl, tr, br, bl))
    }
}

impl Field for Affine {
    const SIZE: usize = 48;

    fn store(&self, out: &mut [u8]) {
        self.as_coeffs().store(out);
    }

    fn load(bytes: &[u8]) -> Self {
        Self::new(<[f64; 6]>::load(bytes))
    }
}

impl Field for Color {
    const SIZE: usize = 16;

    fn store(&self, out: &mut [u8]) {
        self.components.store(out);
    }

    fn load(bytes: &[u8]) -> Self {
        Self::new(<[f32; 4]>::load(bytes))
    }
}

impl Field for IRect {
    const SIZE: usize = 16;

    fn store(&self, out: &mut [u8]) {
        [self.left, self.top, self.right, self.bottom].store(out);
    }

    fn load(bytes: &[u8]) -> Self {
        let [left, top, right, bottom] = <[i32; 4]>::load(bytes);
        Self::new(left, top, right, bottom)
    }
}

impl Field for RsXform {
    const SIZE: usize = 32;

    fn store(&self, out: &mut [u8]) {
        [self.scos, self.ssin, self.tx, self.ty].store(out);
    }

    fn load(bytes: &[u8]) -> Self {
        let [scos, ssin, tx, ty] = <[f64; 4]>::load(bytes);
        Self::new(scos, ssin, tx, ty)
    }
}

impl Field for SaveLayerFlags {
    const SIZE: usize = 4;

    fn store(&self, out: &mut [u8]) {
        self.bits().store(out);
    }

    fn load(bytes: &[u8]) -> Self {
        Self::from_bits_retain(u32::load(bytes))
    }
}

impl Field for ShadowFlags {
    const SIZE: usize = 4;

    fn store(&self, out: &mut [u8]) {
        self.bits().store(out);
    }

    fn load(bytes: &[u8]) -> Self {
        Self::from_bits_retain(u32::load(bytes))
    }
}

impl Field for Paint {
    const SIZE: usize = Color::SIZE + 4 + 4 + 4 + 1;

    fn store(&self, out: &mut [u8]) {
        let mut pack = Pack::new(out);
        pack.put(self.color);
        pack.put(self.stroke_width);
        pack.put(self.stroke_miter);
        pack.put(self.style);
        pack.put(self.cap);
        pack.put(self.join);
        pack.put(self.blend_mode);
        pack.put(self.anti_alias);
    }

    fn load(bytes: &[u8]) -> Self {
        let mut unpack = Unpack::new(bytes);
        Self {
            color: unpack.get(),
            stroke_width: unpack.get(),
            stroke_miter: unpack.get(),
            style: unpack.get(),
            cap: unpack.get(),
            join: unpack.get(),
            blend_mode: unpack.get(),
            anti_alias: unpack.get(),
        }
    }
}

impl Field for ShadowRec {
    const SIZE: usize = 24 + 24 + 8 + Color::SIZE * 2 + 4;

    fn store(&self, out: &mut [u8]) {
        let mut pack = Pack::new(out);
        pack.put(self.z_plane);
        pack.put(self.light_pos);
        pack.put(self.light_radius);
        pack.put(self.ambient_color);
        pack.put(self.spot_color);
        pack.put(self.flags);
    }

    fn load(bytes: &[u8]) -> Self {
        let mut unpack = Unpack::new(bytes);
        Self {
            z_plane: unpack.get(),
            light_pos: unpack.get(),
            light_radius: unpack.get(),
            ambient_color: unpack.get(),
            spot_color: unpack.get(),
            flags: unpack.get(),
        }
    }
}

/// A run of fields passed to or decoded from a record.
///
/// On the recording side this wraps a native slice. On the playback side it
/// views the undecoded little-endian bytes inside the record, and elements are
/// decoded on access.
pub struct Array<'a, T> {
    repr: Repr<'a, T>,
}

enum Repr<'a, T> {
    Native(&'a [T]),
    Encoded(&'a [u8], PhantomData<T>),
}

impl<T> Clone for Repr<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Repr<'_, T> {}

impl<T> Clone for Array<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Array<'_, T> {}

impl<'a, T: Field> Array<'a, T> {
    /// Wrap a native slice.
    #[inline]
    pub const fn new(values: &'a [T]) -> Self {
        Self {
            repr: Repr::Native(values),
        }
    }

    pub(crate) fn encoded(bytes: &'a [u8]) -> Self {
        debug_assert_eq!(
            bytes.len() % T::SIZE,
            0,
            "encoded array length must be a multiple of the element size"
        );
        Self {
            repr: Repr::Encoded(bytes, PhantomData),
        }
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        match self.repr {
            Repr::Native(values) => values.len(),
            Repr::Encoded(bytes, _) => bytes.len() / T::SIZE,
        }
    }

    /// Returns `true` if the array has no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the element at `index`, if any.
    pub fn get(&self, index: usize) -> Option<T> {
        match self.repr {
            Repr::Native(values) => values.get(index).copied(),
            Repr::Encoded(bytes, _) => {
                let start = index.checked_mul(T::SIZE)?;
                let end = start.checked_add(T::SIZE)?;
                bytes.get(start..end).map(T::load)
            }
        }
    }

    /// Iterate over the elements in order.
    #[inline]
    pub fn iter(&self) -> ArrayIter<'a, T> {
        ArrayIter {
            array: *self,
            index: 0,
        }
    }

    /// Collect the elements into a vector.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }
}

impl<T: Field> Default for Array<'_, T> {
    fn default() -> Self {
        Self::new(&[])
    }
}

impl<'a, T: Field> From<&'a [T]> for Array<'a, T> {
    fn from(values: &'a [T]) -> Self {
        Self::new(values)
    }
}

impl<'a, T: Field, const N: usize> From<&'a [T; N]> for Array<'a, T> {
    fn from(values: &'a [T; N]) -> Self {
        Self::new(values)
    }
}

impl<'a, T: Field> From<&'a Vec<T>> for Array<'a, T> {
    fn from(values: &'a Vec<T>) -> Self {
        Self::new(values)
    }
}

impl<T: Field + PartialEq> PartialEq for Array<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Field + fmt::Debug> fmt::Debug for Array<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T: Field> IntoIterator for Array<'a, T> {
    type Item = T;
    type IntoIter = ArrayIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the elements of an [`Array`].
#[derive(Clone)]
pub struct ArrayIter<'a, T> {
    array: Array<'a, T>,
    index: usize,
}

impl<T: Field + fmt::Debug> fmt::Debug for ArrayIter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayIter")
            .field("array", &self.array)
            .field("index", &self.index)
            .finish()
    }
}

impl<T: Field> Iterator for ArrayIter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let value = self.array.get(self.index)?;
        self.index += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.array.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl<T: Field> ExactSizeIterator for ArrayIter<'_, T> {}

/// A shared handle owned by a display list slot.
#[derive(Clone, Debug)]
pub(crate) enum Resource {
    Image(Arc<Image>),
    TextBlob(Arc<TextBlob>),
    Picture(Arc<Picture>),
    Drawable(Arc<dyn Drawable>),
    Filter(Arc<ImageFilter>),
    Vertices(Arc<Vertices>),
}

/// Shared handle types that can occupy a slot.
pub(crate) trait Handle {
    const NAME: &'static str;

    fn to_resource(&self) -> Resource;

    fn from_resource(resource: &Resource) -> Option<&Self>;
}

macro_rules! handle {
    ($ty:ty, $variant:ident) => {
        impl Handle for $ty {
            const NAME: &'static str = stringify!($variant);

            fn to_resource(&self) -> Resource {
                Resource::$variant(Arc::clone(self))
            }

            fn from_resource(resource: &Resource) -> Option<&Self> {
                match resource {
                    Resource::$variant(handle) => Some(handle),
                    _ => None,
                }
            }
        }
    };
}

handle!(Arc<Image>, Image);
handle!(Arc<TextBlob>, TextBlob);
handle!(Arc<Picture>, Picture);
handle!(Arc<dyn Drawable>, Drawable);
handle!(Arc<ImageFilter>, Filter);
handle!(Arc<Vertices>, Vertices);

/// Convert an element count to its `u32` record field.
pub(crate) fn count32(len: usize) -> u32 {
    u32::try_from(len).expect("display list: element count exceeds u32")
}

/// Number of verbs and points used to store `path`.
pub(crate) fn path_counts(path: &BezPath) -> (u32, u32) {
    let points: usize = path
        .elements()
        .iter()
        .map(|el| match el {
            PathEl::MoveTo(_) | PathEl::LineTo(_) => 1,
            PathEl::QuadTo(..) => 2,
            PathEl::CurveTo(..) => 3,
            PathEl::ClosePath => 0,
        })
        .sum();
    (count32(path.elements().len()), count32(points))
}

const VERB_MOVE: u8 = 0;
const VERB_LINE: u8 = 1;
const VERB_QUAD: u8 = 2;
const VERB_CUBIC: u8 = 3;
const VERB_CLOSE: u8 = 4;

struct Sink<'a> {
    bytes: &'a mut Vec<u8>,
    slots: &'a mut Vec<Resource>,
}

/// Appends payload fields.
///
/// A writer without a sink only measures: it counts bytes and leaves the
/// slot table alone, so the same `encode` routine sizes and writes a record.
pub(crate) struct Writer<'a> {
    sink: Option<Sink<'a>>,
    len: usize,
}

impl<'a> Writer<'a> {
    pub(crate) fn measure() -> Self {
        Self { sink: None, len: 0 }
    }

    pub(crate) fn new(bytes: &'a mut Vec<u8>, slots: &'a mut Vec<Resource>) -> Self {
        Self {
            sink: Some(Sink { bytes, slots }),
            len: 0,
        }
    }

    /// Bytes written (or measured) so far.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn put<T: Field>(&mut self, value: T) {
        if let Some(sink) = &mut self.sink {
            let start = sink.bytes.len();
            sink.bytes.resize(start + T::SIZE, 0);
            value.store(&mut sink.bytes[start..]);
        }
        self.len += T::SIZE;
    }

    pub(crate) fn put_bytes(&mut self, bytes: &[u8]) {
        if let Some(sink) = &mut self.sink {
            sink.bytes.extend_from_slice(bytes);
        }
        self.len += bytes.len();
    }

    pub(crate) fn put_array<T: Field>(&mut self, values: Array<'_, T>) {
        match values.repr {
            Repr::Encoded(bytes, _) => self.put_bytes(bytes),
            Repr::Native(values) => {
                for value in values {
                    self.put(*value);
                }
            }
        }
    }

    pub(crate) fn put_handle<H: Handle>(&mut self, handle: &H) {
        let index = match &mut self.sink {
            Some(sink) => {
                sink.slots.push(handle.to_resource());
                count32(sink.slots.len() - 1)
            }
            None => 0,
        };
        self.put(index);
    }

    pub(crate) fn put_optional_handle<H: Handle>(&mut self, handle: Option<&H>) {
        self.put(handle.is_some());
        match handle {
            Some(handle) => self.put_handle(handle),
            None => self.put(0_u32),
        }
    }

    /// Writes the verb and point counts of `path`; pair with [`Writer::put_path_body`].
    pub(crate) fn put_path_counts(&mut self, path: &BezPath) {
        let (verbs, points) = path_counts(path);
        self.put(verbs);
        self.put(points);
    }

    pub(crate) fn put_path_body(&mut self, path: &BezPath) {
        for el in path.elements() {
            self.put(match el {
                PathEl::MoveTo(_) => VERB_MOVE,
                PathEl::LineTo(_) => VERB_LINE,
                PathEl::QuadTo(..) => VERB_QUAD,
                PathEl::CurveTo(..) => VERB_CUBIC,
                PathEl::ClosePath => VERB_CLOSE,
            });
        }
        for el in path.elements() {
            match *el {
                PathEl::MoveTo(p) | PathEl::LineTo(p) => self.put(p),
                PathEl::QuadTo(p1, p2) => {
                    self.put(p1);
                    self.put(p2);
                }
                PathEl::CurveTo(p1, p2, p3) => {
                    self.put(p1);
                    self.put(p2);
                    self.put(p3);
                }
                PathEl::ClosePath => {}
            }
        }
    }
}

/// Reads payload fields from exactly one record.
///
/// Reading past the record is a fatal error.
pub(crate) struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
    slots: &'a [Resource],
}

impl<'a> Reader<'a> {
    pub(crate) fn new(bytes: &'a [u8], slots: &'a [Resource]) -> Self {
        Self {
            bytes,
            pos: 0,
            slots,
        }
    }

    pub(crate) fn bytes(&mut self, len: usize) -> &'a [u8] {
        let end = self.pos + len;
        assert!(
            end <= self.bytes.len(),
            "display list: payload overrun (need {end} bytes, record holds {})",
            self.bytes.len()
        );
        let out = &self.bytes[self.pos..end];
        self.pos = end;
        out
    }

    pub(crate) fn get<T: Field>(&mut self) -> T {
        T::load(self.bytes(T::SIZE))
    }

    /// Reads a `u32` element count.
    pub(crate) fn count(&mut self) -> usize {
        self.get::<u32>() as usize
    }

    pub(crate) fn array<T: Field>(&mut self, len: usize) -> Array<'a, T> {
        Array::encoded(self.bytes(len * T::SIZE))
    }

    pub(crate) fn handle<H: Handle>(&mut self) -> &'a H {
        let index = self.count();
        self.slot(index)
    }

    pub(crate) fn optional_handle<H: Handle>(&mut self) -> Option<&'a H> {
        let present: bool = self.get();
        let index = self.count();
        present.then(|| self.slot(index))
    }

    fn slot<H: Handle>(&self, index: usize) -> &'a H {
        let slots = self.slots;
        match slots.get(index).and_then(H::from_resource) {
            Some(handle) => handle,
            None => panic!("display list: slot {index} does not hold a {}", H::NAME),
        }
    }

    pub(crate) fn path_counts(&mut self) -> (usize, usize) {
        (self.count(), self.count())
    }

    pub(crate) fn path(&mut self, verbs: usize, points: usize) -> BezPath {
        let tags = self.bytes(verbs);
        let mut points = self.array::<Point>(points).iter();
        let mut point = || {
            points
                .next()
                .unwrap_or_else(|| panic!("display list: path record is missing points"))
        };
        let mut path = BezPath::new();
        for &tag in tags {
            let el = match tag {
                VERB_MOVE => PathEl::MoveTo(point()),
                VERB_LINE => PathEl::LineTo(point()),
                VERB_QUAD => {
                    let p1 = point();
                    PathEl::QuadTo(p1, point())
                }
                VERB_CUBIC => {
                    let p1 = point();
                    let p2 = point();
                    PathEl::CurveTo(p1, p2, point())
                }
                VERB_CLOSE => PathEl::ClosePath,
                _ => panic!("display list: invalid path verb {tag}"),
            };
            path.push(el);
        }
        path
    }
}

/// Walks a record payload in place, rewriting color-bearing fields.
///
/// Layout walks mirror the field order used by each record's `encode`.
pub(crate) struct ColorCursor<'a> {
    bytes: &'a mut [u8],
    pos: usize,
}

impl<'a> ColorCursor<'a> {
    pub(crate) fn new(bytes: &'a mut [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn span(&mut self, len: usize) -> &mut [u8] {
        let end = self.pos + len;
        assert!(
            end <= self.bytes.len(),
            "display list: color walk overran record ({end} > {})",
            self.bytes.len()
        );
        let start = self.pos;
        self.pos = end;
        &mut self.bytes[start..end]
    }

    pub(crate) fn skip<T: Field>(&mut self) {
        self.skip_n::<T>(1);
    }

    pub(crate) fn skip_n<T: Field>(&mut self, count: usize) {
        self.span(T::SIZE * count);
    }

    pub(crate) fn skip_handle(&mut self) {
        self.skip::<u32>();
    }

    pub(crate) fn skip_optional_handle(&mut self) {
        self.skip::<bool>();
        self.skip::<u32>();
    }

    pub(crate) fn read<T: Field>(&mut self) -> T {
        T::load(self.span(T::SIZE))
    }

    pub(crate) fn count(&mut self) -> usize {
        self.read::<u32>() as usize
    }

    pub(crate) fn map<T: Field>(&mut self, f: impl FnOnce(T) -> T) {
        let slot = self.span(T::SIZE);
        f(T::load(slot)).store(slot);
    }

    pub(crate) fn map_paint(&mut self, f: &mut dyn FnMut(Color) -> Color) {
        self.map(|paint: Paint| paint.map_color(f));
    }

    pub(crate) fn map_optional_paint(&mut self, f: &mut dyn FnMut(Color) -> Color) {
        self.map(|paint: Option<Paint>| paint.map(|paint| paint.map_color(f)));
    }

    pub(crate) fn map_colors(&mut self, count: usize, f: &mut dyn FnMut(Color) -> Color) {
        for _ in 0..count {
            self.map(|color: Color| f(color));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn round_trip<T: Field>(value: T) -> T {
        let mut bytes = vec![0_u8; T::SIZE];
        value.store(&mut bytes);
        T::load(&bytes)
    }

    #[test]
    fn optional_slots_are_fixed_size_and_zeroed() {
        let mut bytes = vec![0xAA_u8; <Option<Rect>>::SIZE];
        None::<Rect>.store(&mut bytes);
        assert!(bytes.iter().all(|b| *b == 0), "absent slot must be zeroed");
        assert_eq!(<Option<Rect>>::SIZE, 33);
        let rect = Rect::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(round_trip(Some(rect)), Some(rect));
    }

    #[test]
    fn paint_encoding_keeps_every_field() {
        let paint = Paint {
            color: Color::from_rgba8(10, 20, 30, 40),
            style: PaintStyle::StrokeAndFill,
            stroke_width: 3.5,
            stroke_miter: 2.0,
            cap: Cap::Round,
            join: Join::Bevel,
            blend_mode: BlendMode::Multiply,
            anti_alias: true,
        };
        assert_eq!(round_trip(paint), paint);
    }

    #[test]
    fn encoded_array_decodes_lazily() {
        let points = [Point::new(1.0, 2.0), Point::new(3.0, 4.0)];
        let mut bytes = vec![0_u8; Point::SIZE * 2];
        points.store(&mut bytes);

        let array = Array::<Point>::encoded(&bytes);
        assert_eq!(array.len(), 2);
        assert_eq!(array.get(1), Some(Point::new(3.0, 4.0)));
        assert_eq!(array.get(2), None);
        assert_eq!(array, Array::new(&points));
    }

    #[test]
    fn encoded_array_rejects_huge_indices() {
        let mut bytes = vec![0_u8; Point::SIZE * 2];
        [Point::ORIGIN, Point::ORIGIN].store(&mut bytes);

        let array = Array::<Point>::encoded(&bytes);
        assert_eq!(array.get(usize::MAX / Point::SIZE), None);
        assert_eq!(array.get(usize::MAX / Point::SIZE - 1), None);
        assert_eq!(array.get(usize::MAX), None);
    }

    #[test]
    #[should_panic(expected = "invalid ClipOp tag 9")]
    fn unknown_enum_tag_is_fatal() {
        let _ = ClipOp::load(&[9]);
    }

    #[test]
    #[should_panic(expected = "payload overrun")]
    fn reading_past_the_record_is_fatal() {
        let bytes = [0_u8; 3];
        let mut reader = Reader::new(&bytes, &[]);
        let _: u32 = reader.get();
    }

    #[test]
    fn path_body_round_trips_every_verb() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((10.0, 0.0));
        path.quad_to((15.0, 5.0), (10.0, 10.0));
        path.curve_to((5.0, 15.0), (0.0, 15.0), (0.0, 10.0));
        path.close_path();

        let mut bytes = Vec::new();
        let mut slots = Vec::new();
        let mut writer = Writer::new(&mut bytes, &mut slots);
        writer.put_path_counts(&path);
        writer.put_path_body(&path);
        let written = writer.len();
        assert_eq!(written, bytes.len());

        let mut reader = Reader::new(&bytes, &slots);
        let (verbs, points) = reader.path_counts();
        assert_eq!((verbs, points), (5, 7));
        assert_eq!(reader.path(verbs, points), path);
    }
}
