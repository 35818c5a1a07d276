// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording every operation kind, then decoding, replaying and recoloring it.

use std::sync::Arc;

use kurbo::{Affine, BezPath, Point, Rect, RoundedRect};
use peniko::Color;
use understory_display_list::{
    Array, BlendMode, Canvas, ClipOp, ColorTransform, DisplayListData, Drawable, IRect, Image,
    ImageFilter, InvertColors, Lattice, LatticeRectType, MultiplyAlpha, Op, OpKind, Paint,
    Picture, PointMode, RecordingCanvas, Region, RsXform, SaveLayerFlags, SaveLayerRec,
    ShadowFlags, ShadowRec, SrcRectConstraint, TextBlob, VertexMode, Vertices,
};

#[derive(Debug)]
struct Badge;

impl Drawable for Badge {
    fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, 8.0, 8.0)
    }

    fn snapshot(&self) -> Arc<Picture> {
        Arc::new(Picture::record(self.bounds(), |canvas| {
            canvas.draw_oval(&self.bounds(), &Paint::new(Color::WHITE));
        }))
    }
}

struct Fixtures {
    image: Arc<Image>,
    blob: Arc<TextBlob>,
    vertices: Arc<Vertices>,
    filter: Arc<ImageFilter>,
    picture: Arc<Picture>,
    drawable: Arc<dyn Drawable>,
    path: BezPath,
    region: Region,
}

impl Fixtures {
    fn new() -> Self {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((40.0, 0.0));
        path.quad_to((50.0, 20.0), (40.0, 40.0));
        path.curve_to((30.0, 50.0), (10.0, 50.0), (0.0, 40.0));
        path.close_path();

        Self {
            image: Arc::new(Image::rgba8(2, 2, vec![255; 16])),
            blob: Arc::new(TextBlob {
                glyphs: vec![3, 4, 5],
                positions: vec![Point::new(0.0, 0.0), Point::new(6.0, 0.0), Point::new(12.0, 0.0)],
                bounds: Rect::new(0.0, -10.0, 18.0, 2.0),
            }),
            vertices: Arc::new(Vertices {
                mode: VertexMode::TriangleFan,
                positions: vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(5.0, 8.0)],
                colors: Some(vec![Color::WHITE; 3]),
                ..Vertices::default()
            }),
            filter: Arc::new(ImageFilter::blur(2.0, 3.0)),
            picture: Arc::new(Picture::record(Rect::new(0.0, 0.0, 16.0, 16.0), |canvas| {
                canvas.draw_rect(&Rect::new(1.0, 1.0, 15.0, 15.0), &Paint::new(Color::BLACK));
            })),
            drawable: Arc::new(Badge),
            path,
            region: Region::from_rects([IRect::new(0, 0, 10, 10), IRect::new(20, 20, 30, 25)]),
        }
    }
}

const RECT: Rect = Rect::new(10.0, 20.0, 110.0, 70.0);

fn rrect() -> RoundedRect {
    RoundedRect::from_rect(RECT, (4.0, 5.0, 6.0, 7.0))
}

/// Issues one call per operation kind. Every color stored in a record goes
/// through `map`.
fn record_everything(canvas: &mut impl Canvas, fx: &Fixtures, map: &dyn Fn(Color) -> Color) {
    let paint = Paint::new(map(Color::from_rgba8(200, 40, 40, 255))).with_anti_alias(true);
    let stroke = Paint::stroke(map(Color::from_rgba8(10, 120, 250, 128)), 3.0)
        .with_blend_mode(BlendMode::Screen);

    canvas.flush();
    canvas.save();
    canvas.save_layer(
        &SaveLayerRec::new(Some(RECT), Some(stroke))
            .with_backdrop(&fx.filter)
            .with_clip_mask(&fx.image, Some(Affine::scale(2.0)))
            .with_flags(SaveLayerFlags::INIT_WITH_PREVIOUS),
    );
    canvas.concat(&Affine::rotate(0.5));
    canvas.set_matrix(&Affine::translate((3.0, 4.0)));
    canvas.translate(10.0, 20.0);
    canvas.translate_z(2.5);
    canvas.clip_path(&fx.path, ClipOp::Intersect, true);
    canvas.clip_rect(&RECT, ClipOp::Difference, false);
    canvas.clip_rrect(&rrect(), ClipOp::Intersect, true);
    canvas.clip_region(&fx.region, ClipOp::Intersect);

    canvas.draw_paint(&paint);
    canvas.draw_path(&fx.path, &stroke);
    canvas.draw_rect(&RECT, &paint);
    canvas.draw_region(&fx.region, &paint);
    canvas.draw_oval(&RECT, &stroke);
    canvas.draw_arc(&RECT, 30.0, 120.0, true, &paint);
    canvas.draw_rrect(&rrect(), &paint);
    canvas.draw_drrect(&rrect(), &RoundedRect::new(20.0, 30.0, 40.0, 50.0, 2.0), &paint);
    canvas.draw_annotation(&RECT, "link", Some(b"https://example.com"));
    canvas.draw_drawable(&fx.drawable, Some(&Affine::translate((1.0, 1.0))));
    canvas.draw_picture(&fx.picture, None, Some(&paint));

    canvas.draw_text(b"hello", 1.0, 2.0, &paint);
    let positions = [Point::new(0.0, 0.0), Point::new(8.0, 1.0)];
    canvas.draw_pos_text(b"hi", Array::new(&positions), &paint);
    canvas.draw_pos_text_h(b"abc", Array::new(&[1.0, 9.0, 17.0]), 7.0, &paint);
    let glyph_xforms = [RsXform::translate(0.0, 0.0), RsXform::new(0.0, 1.0, 5.0, 5.0)];
    canvas.draw_text_rsxform(b"xy", Array::new(&glyph_xforms), Some(&RECT), &paint);
    canvas.draw_text_blob(&fx.blob, 4.0, 30.0, &paint);

    canvas.draw_image(&fx.image, 5.0, 6.0, None);
    canvas.draw_image_nine(&fx.image, &IRect::new(1, 1, 2, 2), &RECT, Some(&paint));
    canvas.draw_image_rect(
        &fx.image,
        Some(&Rect::new(0.0, 0.0, 1.0, 1.0)),
        &RECT,
        None,
        SrcRectConstraint::Strict,
    );
    let x_divs = [1, 2];
    let y_divs = [1];
    let rect_types = [
        LatticeRectType::Default,
        LatticeRectType::Transparent,
        LatticeRectType::FixedColor,
        LatticeRectType::Default,
        LatticeRectType::FixedColor,
        LatticeRectType::Default,
    ];
    let lattice_colors = [map(Color::from_rgba8(1, 2, 3, 255)); 6];
    let lattice = Lattice {
        x_divs: Array::new(&x_divs),
        y_divs: Array::new(&y_divs),
        rect_types: Some(Array::new(&rect_types)),
        bounds: Some(IRect::new(0, 0, 2, 2)),
        colors: Some(Array::new(&lattice_colors)),
    };
    canvas.draw_image_lattice(&fx.image, &lattice, &RECT, Some(&stroke));

    let cubics: [Point; 12] = core::array::from_fn(|i| Point::new(i as f64, (i * 2) as f64));
    let corner_colors = [
        map(Color::from_rgba8(255, 0, 0, 255)),
        map(Color::from_rgba8(0, 255, 0, 255)),
        map(Color::from_rgba8(0, 0, 255, 255)),
        map(Color::from_rgba8(255, 255, 0, 255)),
    ];
    let tex_coords = [
        Point::ZERO,
        Point::new(1.0, 0.0),
        Point::new(1.0, 1.0),
        Point::new(0.0, 1.0),
    ];
    canvas.draw_patch(
        &cubics,
        Some(&corner_colors),
        Some(&tex_coords),
        BlendMode::Modulate,
        &paint,
    );
    let points = [Point::new(1.0, 1.0), Point::new(5.0, 2.0), Point::new(9.0, 7.0)];
    canvas.draw_points(PointMode::Polygon, Array::new(&points), &stroke);
    canvas.draw_vertices(&fx.vertices, BlendMode::Dst, &paint);
    let sprite_xforms = [RsXform::translate(0.0, 0.0), RsXform::translate(10.0, 0.0)];
    let sprite_tex = [Rect::new(0.0, 0.0, 1.0, 1.0), Rect::new(1.0, 1.0, 2.0, 2.0)];
    let sprite_colors = [
        map(Color::from_rgba8(9, 9, 9, 255)),
        map(Color::from_rgba8(90, 90, 90, 255)),
    ];
    canvas.draw_atlas(
        &fx.image,
        Array::new(&sprite_xforms),
        Array::new(&sprite_tex),
        Some(Array::new(&sprite_colors)),
        BlendMode::Plus,
        Some(&RECT),
        Some(&paint),
    );
    canvas.draw_shadow_rec(
        &fx.path,
        &ShadowRec {
            z_plane: [0.0, 0.0, 8.0],
            light_pos: [100.0, -200.0, 600.0],
            light_radius: 800.0,
            ambient_color: map(Color::from_rgba8(0, 0, 0, 10)),
            spot_color: map(Color::from_rgba8(0, 0, 0, 60)),
            flags: ShadowFlags::TRANSPARENT_OCCLUDER,
        },
    );
    canvas.restore();
}

fn identity(color: Color) -> Color {
    color
}

fn record(fx: &Fixtures, map: &dyn Fn(Color) -> Color) -> DisplayListData {
    let mut dl = DisplayListData::new();
    record_everything(
        &mut RecordingCanvas::new(&mut dl, IRect::from_size(640, 480)),
        fx,
        map,
    );
    dl
}

/// Addresses of the shared handles an operation references, in field order.
fn handles(op: &Op<'_>) -> Vec<*const ()> {
    fn ptr<T: ?Sized>(handle: &Arc<T>) -> *const () {
        Arc::as_ptr(handle).cast::<()>()
    }
    match op {
        Op::SaveLayer(op) => op
            .rec
            .backdrop
            .map(ptr)
            .into_iter()
            .chain(op.rec.clip_mask.map(ptr))
            .collect(),
        Op::DrawDrawable(op) => vec![ptr(op.drawable)],
        Op::DrawPicture(op) => vec![ptr(op.picture)],
        Op::DrawTextBlob(op) => vec![ptr(op.blob)],
        Op::DrawImage(op) => vec![ptr(op.image)],
        Op::DrawImageNine(op) => vec![ptr(op.image)],
        Op::DrawImageRect(op) => vec![ptr(op.image)],
        Op::DrawImageLattice(op) => vec![ptr(op.image)],
        Op::DrawVertices(op) => vec![ptr(op.vertices)],
        Op::DrawAtlas(op) => vec![ptr(op.atlas)],
        _ => Vec::new(),
    }
}

#[test]
fn every_kind_is_recorded_exactly_once() {
    let fx = Fixtures::new();
    let dl = record(&fx, &identity);
    let mut kinds: Vec<_> = dl.records().map(|r| r.kind).collect();
    assert_eq!(kinds.len(), OpKind::COUNT);
    kinds.sort();
    assert_eq!(kinds, OpKind::ALL);
}

#[test]
fn skip_distances_visit_every_record_once() {
    let fx = Fixtures::new();
    let dl = record(&fx, &identity);
    let mut next = 0;
    let mut visited = 0;
    for header in dl.records() {
        assert_eq!(
            header.offset, next,
            "{} does not start where the previous record ends",
            header.kind
        );
        assert_eq!(header.len % 4, 0, "{} is not padded", header.kind);
        next = header.end();
        visited += 1;
    }
    assert_eq!(next, dl.used());
    assert_eq!(visited, dl.iter().count());
}

#[test]
fn replay_into_a_recording_reproduces_the_buffer() {
    let fx = Fixtures::new();
    let original = record(&fx, &identity);
    let mut copy = DisplayListData::new();
    original.draw(&mut RecordingCanvas::new(&mut copy, IRect::from_size(640, 480)));

    assert_eq!(original.as_bytes(), copy.as_bytes());
    for (a, b) in original.iter().zip(copy.iter()) {
        assert_eq!(a.kind(), b.kind());
        assert_eq!(handles(&a), handles(&b), "{} references different handles", a.kind());
    }
}

#[test]
fn decoded_arguments_match_the_call() {
    let fx = Fixtures::new();
    let dl = record(&fx, &identity);
    let mut seen = 0;
    for op in &dl {
        match op {
            Op::SaveLayer(op) => {
                assert_eq!(op.rec.bounds, Some(RECT));
                assert!(Arc::ptr_eq(op.rec.backdrop.unwrap(), &fx.filter));
                assert!(Arc::ptr_eq(op.rec.clip_mask.unwrap(), &fx.image));
                assert_eq!(op.rec.clip_matrix, Some(Affine::scale(2.0)));
                assert_eq!(op.rec.flags, SaveLayerFlags::INIT_WITH_PREVIOUS);
                assert_eq!(op.rec.paint.unwrap().blend_mode, BlendMode::Screen);
            }
            Op::Concat(op) => assert_eq!(op.matrix, Affine::rotate(0.5)),
            Op::ClipPath(op) => {
                assert_eq!(*op.path, fx.path);
                assert_eq!((op.op, op.anti_alias), (ClipOp::Intersect, true));
            }
            Op::ClipRRect(op) => assert_eq!(op.rrect, rrect()),
            Op::ClipRegion(op) => assert_eq!(*op.region, fx.region),
            Op::DrawArc(op) => {
                assert_eq!(op.oval, RECT);
                assert_eq!((op.start_angle, op.sweep_angle, op.use_center), (30.0, 120.0, true));
            }
            Op::DrawAnnotation(op) => {
                assert_eq!(op.key, "link");
                assert_eq!(op.value, Some(&b"https://example.com"[..]));
            }
            Op::DrawDrawable(op) => {
                assert!(Arc::ptr_eq(op.drawable, &fx.drawable));
                assert_eq!(op.matrix, Some(Affine::translate((1.0, 1.0))));
            }
            Op::DrawPicture(op) => {
                assert!(Arc::ptr_eq(op.picture, &fx.picture));
                assert_eq!(op.matrix, None);
            }
            Op::DrawText(op) => assert_eq!((op.text, op.x, op.y), (&b"hello"[..], 1.0, 2.0)),
            Op::DrawPosText(op) => {
                assert_eq!(op.text, b"hi");
                assert_eq!(op.pos.to_vec(), [Point::new(0.0, 0.0), Point::new(8.0, 1.0)]);
            }
            Op::DrawPosTextH(op) => {
                assert_eq!(op.xpos, Array::new(&[1.0, 9.0, 17.0]));
                assert_eq!(op.const_y, 7.0);
            }
            Op::DrawTextRSXform(op) => {
                assert_eq!(op.xforms.get(1), Some(RsXform::new(0.0, 1.0, 5.0, 5.0)));
                assert_eq!(op.cull, Some(RECT));
            }
            Op::DrawImageRect(op) => {
                assert_eq!(op.src, Some(Rect::new(0.0, 0.0, 1.0, 1.0)));
                assert_eq!(op.constraint, SrcRectConstraint::Strict);
                assert_eq!(op.paint, None);
            }
            Op::DrawImageLattice(op) => {
                let lattice = op.lattice;
                assert_eq!(lattice.x_divs.to_vec(), [1, 2]);
                assert_eq!(lattice.y_divs.to_vec(), [1]);
                assert_eq!(lattice.rect_types.unwrap().get(2), Some(LatticeRectType::FixedColor));
                assert_eq!(lattice.bounds, Some(IRect::new(0, 0, 2, 2)));
                assert_eq!(lattice.colors.unwrap().len(), 6);
            }
            Op::DrawPatch(op) => {
                assert_eq!(op.cubics[11], Point::new(11.0, 22.0));
                assert_eq!(op.colors.unwrap()[2], Color::from_rgba8(0, 0, 255, 255));
                assert_eq!(op.mode, BlendMode::Modulate);
            }
            Op::DrawPoints(op) => {
                assert_eq!(op.mode, PointMode::Polygon);
                assert_eq!(op.points.len(), 3);
            }
            Op::DrawAtlas(op) => {
                assert_eq!(op.xforms.len(), 2);
                assert_eq!(op.tex.get(1), Some(Rect::new(1.0, 1.0, 2.0, 2.0)));
                assert_eq!(op.colors.map(|c| c.len()), Some(2));
                assert_eq!((op.mode, op.cull), (BlendMode::Plus, Some(RECT)));
            }
            Op::DrawShadowRec(op) => {
                assert_eq!(*op.path, fx.path);
                assert_eq!(op.rec.light_radius, 800.0);
                assert_eq!(op.rec.flags, ShadowFlags::TRANSPARENT_OCCLUDER);
            }
            _ => continue,
        }
        seen += 1;
    }
    assert_eq!(seen, 19);
}

#[test]
fn buffer_owns_one_reference_per_record() {
    let fx = Fixtures::new();
    let image_refs = Arc::strong_count(&fx.image);
    let picture_refs = Arc::strong_count(&fx.picture);

    let dl = record(&fx, &identity);
    // Clip mask, image, nine, rect, lattice and atlas.
    assert_eq!(Arc::strong_count(&fx.image), image_refs + 6);
    assert_eq!(Arc::strong_count(&fx.picture), picture_refs + 1);
    assert_eq!(Arc::strong_count(&fx.drawable), 2);

    let copy = dl.clone();
    assert_eq!(Arc::strong_count(&fx.image), image_refs + 12);

    drop(dl);
    drop(copy);
    assert_eq!(Arc::strong_count(&fx.image), image_refs);
    assert_eq!(Arc::strong_count(&fx.picture), picture_refs);
    assert_eq!(Arc::strong_count(&fx.blob), 1);
    assert_eq!(Arc::strong_count(&fx.vertices), 1);
    assert_eq!(Arc::strong_count(&fx.filter), 1);
}

#[test]
fn color_transform_only_rewrites_colors() {
    let fx = Fixtures::new();
    let swap = |c: Color| {
        let [r, g, b, a] = c.components;
        Color::new([b, r, g, a])
    };

    let mut transformed = record(&fx, &identity);
    let boundaries: Vec<_> = transformed.records().collect();
    transformed.apply_color_transform(&swap);

    let expected = record(&fx, &swap);
    assert_eq!(transformed.as_bytes(), expected.as_bytes());
    assert_eq!(transformed.records().collect::<Vec<_>>(), boundaries);
}

#[test]
fn color_transforms_compose() {
    let fx = Fixtures::new();
    let fade = MultiplyAlpha(0.5);

    let mut stepwise = record(&fx, &identity);
    stepwise.apply_color_transform(&InvertColors);
    stepwise.apply_color_transform(&fade);

    let mut composed = record(&fx, &identity);
    composed.apply_color_transform(&InvertColors.then(fade));

    assert_eq!(stepwise.as_bytes(), composed.as_bytes());
}

#[test]
fn empty_bounds_elide_draws_but_keep_state() {
    let fx = Fixtures::new();
    let mut dl = DisplayListData::new();
    record_everything(&mut RecordingCanvas::new(&mut dl, IRect::default()), &fx, &identity);

    let kinds: Vec<_> = dl.records().map(|r| r.kind).collect();
    assert_eq!(
        kinds,
        [
            OpKind::Flush,
            OpKind::Save,
            OpKind::SaveLayer,
            OpKind::Concat,
            OpKind::SetMatrix,
            OpKind::Translate,
            OpKind::TranslateZ,
            OpKind::ClipPath,
            OpKind::ClipRect,
            OpKind::ClipRRect,
            OpKind::ClipRegion,
            OpKind::Restore,
        ]
    );
}

#[test]
fn drawables_and_pictures_can_be_expanded_at_playback() {
    #[derive(Default)]
    struct Expand {
        depth: usize,
        rects: usize,
        ovals: usize,
    }

    impl Canvas for Expand {
        fn draw_rect(&mut self, _rect: &Rect, _paint: &Paint) {
            self.rects += 1;
        }

        fn draw_oval(&mut self, _oval: &Rect, _paint: &Paint) {
            self.ovals += 1;
        }

        fn draw_picture(
            &mut self,
            picture: &Arc<Picture>,
            _matrix: Option<&Affine>,
            _paint: Option<&Paint>,
        ) {
            self.depth += 1;
            picture.playback(self);
        }

        fn draw_drawable(&mut self, drawable: &Arc<dyn Drawable>, _matrix: Option<&Affine>) {
            drawable.snapshot().playback(self);
        }
    }

    let fx = Fixtures::new();
    let dl = record(&fx, &identity);
    let mut expand = Expand::default();
    dl.draw(&mut expand);
    // One rect recorded directly plus one inside the picture; one oval plus the drawable's.
    assert_eq!((expand.rects, expand.ovals, expand.depth), (2, 2, 1));
}
