use image::{GrayImage, Luma, Rgb, RgbImage};
use onecut::{Backend, BoxMask, Connectivity, Error, Label, OneCut, OneCutParams};

const SIZE: u32 = 12;

/// Dark 4x4 square centred in a light 12x12 image.
fn square_image() -> RgbImage {
    RgbImage::from_fn(SIZE, SIZE, |x, y| {
        if in_square(x, y) {
            Rgb([20, 25, 30])
        } else {
            Rgb([230, 225, 220])
        }
    })
}

fn in_square(x: u32, y: u32) -> bool {
    (4..8).contains(&x) && (4..8).contains(&y)
}

fn square_truth() -> GrayImage {
    GrayImage::from_fn(SIZE, SIZE, |x, y| Luma([if in_square(x, y) { 255 } else { 0 }]))
}

fn params(backend: Backend) -> OneCutParams {
    OneCutParams {
        backend,
        ..OneCutParams::default()
    }
}

fn segment(params: OneCutParams, mask: &BoxMask) -> onecut::Segmentation {
    let mut cut = OneCut::new(&square_image(), params).unwrap();
    cut.construct(mask).unwrap();
    cut.run().unwrap()
}

#[test]
fn dark_square_inside_the_box_is_the_object() {
    let mask = BoxMask::rect(SIZE, SIZE, 2, 2, 10, 10);
    let seg = segment(OneCutParams::default(), &mask);

    for y in 0..SIZE {
        for x in 0..SIZE {
            let expected = if in_square(x, y) {
                Label::Object
            } else {
                Label::Background
            };
            assert_eq!(seg.label(x, y), expected, "pixel ({x}, {y})");
        }
    }
    assert_eq!(seg.object_pixels(), 16);
    assert!(!seg.is_degenerate());
    assert!(seg.flow() > 0);
    assert_eq!(seg.error_rate(&square_truth(), mask.size()).unwrap(), 0.0);
}

#[test]
fn backends_agree_on_flow_and_labels() {
    for connectivity in [Connectivity::Grid4, Connectivity::Grid8, Connectivity::Grid16] {
        let mask = BoxMask::rect(SIZE, SIZE, 3, 2, 10, 9);
        let ibfs = segment(
            OneCutParams {
                connectivity,
                ..params(Backend::Ibfs)
            },
            &mask,
        );
        let dinic = segment(
            OneCutParams {
                connectivity,
                ..params(Backend::Dinic)
            },
            &mask,
        );
        assert_eq!(ibfs.flow(), dinic.flow(), "{connectivity:?}");
        assert_eq!(ibfs.labels(), dinic.labels(), "{connectivity:?}");
    }
}

#[test]
fn pixels_outside_the_box_are_always_background() {
    let mask = BoxMask::rect(SIZE, SIZE, 5, 5, 11, 11);
    let seg = segment(OneCutParams::default(), &mask);
    for y in 0..SIZE {
        for x in 0..SIZE {
            if !(5..11).contains(&x) || !(5..11).contains(&y) {
                assert_eq!(seg.label(x, y), Label::Background, "pixel ({x}, {y})");
            }
        }
    }
}

#[test]
fn moving_the_box_matches_a_fresh_construction() {
    let boxes = [
        BoxMask::rect(SIZE, SIZE, 2, 2, 10, 10),
        BoxMask::rect(SIZE, SIZE, 3, 3, 9, 9),
        BoxMask::rect(SIZE, SIZE, 1, 2, 11, 11),
        BoxMask::rect(SIZE, SIZE, 4, 0, 12, 8),
        BoxMask::rect(SIZE, SIZE, 2, 2, 10, 10),
    ];
    for backend in [Backend::Ibfs, Backend::Dinic] {
        let mut cut = OneCut::new(&square_image(), params(backend)).unwrap();
        cut.construct(&boxes[0]).unwrap();
        cut.run().unwrap();
        for mask in &boxes[1..] {
            cut.update_box(mask).unwrap();
            let warm = cut.run().unwrap();
            let cold = segment(params(backend), mask);
            assert_eq!(warm.flow(), cold.flow(), "{backend:?}");
            assert_eq!(warm.labels(), cold.labels(), "{backend:?}");
        }
    }
}

#[test]
fn update_before_construct_builds_the_graph() {
    let mask = BoxMask::rect(SIZE, SIZE, 2, 2, 10, 10);
    let mut cut = OneCut::new(&square_image(), OneCutParams::default()).unwrap();
    cut.update_box(&mask).unwrap();
    assert_eq!(cut.run().unwrap(), segment(OneCutParams::default(), &mask));
}

#[test]
fn repeated_runs_are_stable() {
    let mut cut = OneCut::new(&square_image(), OneCutParams::default()).unwrap();
    cut.construct(&BoxMask::rect(SIZE, SIZE, 2, 2, 10, 10)).unwrap();
    let first = cut.run().unwrap();
    assert_eq!(cut.run().unwrap(), first);
    assert!(cut.solver_stats().is_some_and(|s| s.augmentations > 0));
}

#[test]
fn whole_image_box_on_a_flat_image_is_degenerate() {
    let image = RgbImage::from_pixel(6, 5, Rgb([90, 90, 90]));
    let mut cut = OneCut::new(&image, OneCutParams::default()).unwrap();
    assert_eq!(cut.bins().len(), 1);
    cut.construct(&BoxMask::rect(6, 5, 0, 0, 6, 5)).unwrap();
    let seg = cut.run().unwrap();
    assert!(seg.is_degenerate());
    assert_eq!(seg.object_pixels(), 30);
    assert_eq!(seg.flow(), 0);
}

#[test]
fn graph_layout_counts_pixels_and_bins() {
    let cut = OneCut::new(&square_image(), OneCutParams::default()).unwrap();
    assert_eq!(cut.dimensions(), (SIZE, SIZE));
    assert_eq!(cut.bins().len(), 2);
    assert_eq!(cut.node_count(), (SIZE * SIZE) as usize + 2);
    // 8-connectivity on a 12x12 grid: 2 * 11 * 12 straight pairs plus 2 * 11 * 11 diagonals.
    assert_eq!(cut.links().len(), 2 * 11 * 12 + 2 * 11 * 11);
}

#[test]
fn run_requires_a_constructed_graph() {
    let mut cut = OneCut::new(&square_image(), OneCutParams::default()).unwrap();
    assert!(matches!(cut.run(), Err(Error::NotConstructed)));
}

#[test]
fn box_masks_are_validated() {
    let mut cut = OneCut::new(&square_image(), OneCutParams::default()).unwrap();
    let err = cut.construct(&BoxMask::rect(5, 5, 1, 1, 3, 3)).unwrap_err();
    assert!(matches!(
        err,
        Error::ImageSize {
            expected: (SIZE, SIZE),
            found: (5, 5),
            ..
        }
    ));
    assert!(matches!(
        cut.construct(&BoxMask::rect(SIZE, SIZE, 3, 3, 3, 9)),
        Err(Error::EmptyBox)
    ));
}

#[test]
fn error_rate_counts_interior_mistakes_only() {
    let mask = BoxMask::rect(SIZE, SIZE, 2, 2, 10, 10);
    let seg = segment(OneCutParams::default(), &mask);

    let mut truth = square_truth();
    // Border pixels are not scored.
    truth.put_pixel(0, 0, Luma([255]));
    // Neither are pixels whose ground truth is unknown.
    truth.put_pixel(5, 5, Luma([128]));
    assert_eq!(seg.error_rate(&truth, 64).unwrap(), 0.0);

    truth.put_pixel(1, 1, Luma([255]));
    truth.put_pixel(4, 4, Luma([0]));
    assert_eq!(seg.error_rate(&truth, 64).unwrap(), 2.0 / 64.0);

    assert!(matches!(
        seg.error_rate(&GrayImage::new(3, 3), 64),
        Err(Error::ImageSize { .. })
    ));
}

#[test]
fn rendered_outputs_follow_the_labels() {
    let image = square_image();
    let seg = segment(
        OneCutParams::default(),
        &BoxMask::rect(SIZE, SIZE, 2, 2, 10, 10),
    );
    let rendered = seg.to_image(&image).unwrap();
    assert_eq!(rendered.get_pixel(5, 5), image.get_pixel(5, 5));
    assert_eq!(*rendered.get_pixel(0, 0), Rgb([255, 255, 255]));
    assert_eq!(seg.to_mask(), square_truth());
}

#[test]
fn params_deserialize_with_defaults() {
    let params: OneCutParams =
        serde_json::from_str(r#"{"connectivity": 4, "backend": "dinic", "potts_weight": 2.5}"#)
            .unwrap();
    assert_eq!(params.connectivity, Connectivity::Grid4);
    assert_eq!(params.backend, Backend::Dinic);
    assert_eq!(params.potts_weight, 2.5);
    assert_eq!(params.color_bin_size, 8);
    assert_eq!(params.scale, 1000.0);

    let round_trip: serde_json::Value = serde_json::to_value(&params).unwrap();
    assert_eq!(round_trip["connectivity"], 4);

    assert!(serde_json::from_str::<OneCutParams>(r#"{"connectivity": 6}"#).is_err());
}

#[test]
fn invalid_bin_size_is_rejected() {
    let params = OneCutParams {
        color_bin_size: 0,
        ..OneCutParams::default()
    };
    assert!(matches!(
        OneCut::new(&square_image(), params),
        Err(Error::ColorBinSize(0))
    ));
}

#[test]
fn grey_box_pixels_count_as_inside() {
    let grey = GrayImage::from_fn(SIZE, SIZE, |x, y| {
        let inside = (2..10).contains(&x) && (2..10).contains(&y);
        Luma([if inside { 200 } else { 255 }])
    });
    let mask = BoxMask::from_luma(&grey);
    assert_eq!(mask, BoxMask::rect(SIZE, SIZE, 2, 2, 10, 10));
    assert_eq!(segment(OneCutParams::default(), &mask).object_pixels(), 16);
}
