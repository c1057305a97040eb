use super::*;
use crate::cache::key::KeyPart;
use crate::foundation::core::Vec2;
use crate::layer::function::FnLayer;
use crate::layer::solid::SolidLayer;

const RED: [u8; 4] = [255, 0, 0, 255];

fn solid(w: u32, h: u32) -> SolidLayer {
    SolidLayer::new(w, h, RED, 10.0).unwrap()
}

fn comp_with(names: &[&str]) -> Composition {
    let mut comp = Composition::new((8, 8), 2.0).unwrap();
    for name in names {
        comp.add_layer(solid(8, 8), LayerOpts::named(*name)).unwrap();
    }
    comp
}

struct Failing;

impl Layer for Failing {
    fn render(&self, _time: f64) -> StratumResult<Option<FrameRGBA>> {
        Err(StratumError::evaluation("boom"))
    }

    fn duration(&self) -> f64 {
        1.0
    }

    fn content_key(&self, _time: f64) -> ContentKey {
        KeyHasher::new("failing").finish()
    }
}

#[test]
fn construction_validates() {
    assert!(matches!(
        Composition::new((0, 10), 1.0),
        Err(StratumError::Validation(_))
    ));
    assert!(Composition::new((10, 10), 0.0).is_err());
    assert!(Composition::new((10, 10), f64::NAN).is_err());

    let comp = Composition::new((10, 20), 1.5).unwrap();
    assert_eq!(comp.size(), Size::new(10, 20).unwrap());
    assert_eq!(comp.preview_level(), 1);
    assert!(comp.is_empty());
}

#[test]
fn setters_fail_fast() {
    let mut comp = Composition::new((10, 10), 1.0).unwrap();
    assert!(comp.set_size((0, 4)).is_err());
    assert!(comp.set_duration(-1.0).is_err());
    assert!(comp.set_preview_level(0).is_err());
    assert_eq!(comp.size(), Size::new(10, 10).unwrap());
    assert_eq!(comp.duration(), 1.0);
    assert_eq!(comp.preview_level(), 1);

    comp.set_size((4, 6)).unwrap();
    comp.set_preview_level(3).unwrap();
    assert_eq!(comp.working_size(), (1, 2));
}

#[test]
fn add_layer_applies_defaults() {
    let mut comp = Composition::new((100, 60), 1.0).unwrap();
    comp.add_layer(solid(4, 4), LayerOpts::default()).unwrap();
    let second = comp.add_layer(solid(4, 4), LayerOpts::default()).unwrap();
    assert_eq!(second.name(), "layer_1");

    let first = comp.get("layer_0").unwrap();
    assert_eq!(first.transform().position, Vec2::new(50.0, 30.0));
    assert_eq!(first.end_time(), 10.0);
    assert_eq!(first.origin_point(), Origin::Center);
}

#[test]
fn duplicate_name_leaves_composition_unchanged() {
    let mut comp = comp_with(&["a"]);
    let err = comp.add_layer(solid(1, 1), LayerOpts::named("a")).unwrap_err();
    assert!(matches!(err, StratumError::Duplicate(_)));

    let err = comp
        .insert_component(Component::new("a", solid(1, 1)))
        .unwrap_err();
    assert!(matches!(err, StratumError::Duplicate(_)));
    assert_eq!(comp.len(), 1);
}

#[test]
fn invalid_layer_opts_leave_composition_unchanged() {
    let mut comp = comp_with(&["a"]);
    let opts = LayerOpts {
        start_time: 2.0,
        end_time: Some(1.0),
        ..LayerOpts::named("b")
    };
    assert!(comp.add_layer(solid(1, 1), opts).is_err());
    assert!(!comp.contains("b"));
    assert_eq!(comp.len(), 1);
}

#[test]
fn pop_keeps_name_index_in_lockstep() {
    let mut comp = comp_with(&["a", "b", "c"]);
    assert_eq!(comp.pop_layer("a").unwrap().name(), "a");
    assert_eq!(comp.names().collect::<Vec<_>>(), vec!["b", "c"]);
    assert_eq!(comp.get("c").unwrap().name(), "c");
    assert_eq!(comp.get_mut("b").unwrap().name(), "b");

    assert!(matches!(
        comp.pop_layer("a"),
        Err(StratumError::NotFound(_))
    ));
    assert!(comp.get("zzz").is_err());
    assert_eq!(comp.len(), 2);
}

#[test]
fn iteration_follows_paint_order() {
    let comp = comp_with(&["bg", "mid", "top"]);
    let names: Vec<_> = comp.iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["bg", "mid", "top"]);
    assert_eq!(comp.layers()[2].name(), "top");
}

#[test]
fn key_has_one_part_per_component() {
    let mut comp = comp_with(&["a", "b"]);
    comp.get_mut("b").unwrap().set_time_window(1.0, 2.0).unwrap();

    let key = comp.get_key(0.5);
    assert_eq!(key.parts.len(), 2);
    assert!(matches!(key.parts[0], KeyPart::Component(_)));
    assert_eq!(key.parts[1], KeyPart::Absent);
    assert_eq!(key, comp.get_key(0.5));
}

#[test]
fn static_content_is_composited_once() {
    let comp = comp_with(&["a"]);
    let f0 = comp.render(0.0).unwrap();
    let f1 = comp.render(1.5).unwrap();
    assert!(Arc::ptr_eq(&f0, &f1));

    let st = comp.cache_stats().unwrap();
    assert_eq!((st.hits, st.misses, st.inserts), (1, 1, 1));
    assert_eq!(comp.cache_len().unwrap(), 1);
}

#[test]
fn preview_level_is_part_of_the_key() {
    let mut comp = comp_with(&["a"]);
    let full = comp.get_key(0.0);
    comp.set_preview_level(2).unwrap();
    assert_ne!(comp.get_key(0.0), full);
    assert_eq!(comp.get_key(0.0).preview_level, 2);
}

#[test]
fn levels_with_equal_working_size_do_not_share_frames() {
    let white = SolidLayer::new(2, 2, [255, 255, 255, 255], 10.0).unwrap();
    let opts = LayerOpts {
        transform: Some(Transform::at(Vec2::new(4.0, 4.0))),
        origin_point: Origin::TopLeft,
        ..LayerOpts::named("dot")
    };
    let mut comp = Composition::new((8, 8), 1.0).unwrap();
    comp.add_layer(white.clone(), opts.clone()).unwrap();
    let mut fresh = Composition::new((8, 8), 1.0).unwrap();
    fresh.add_layer(white, opts).unwrap();

    comp.set_preview_level(5).unwrap();
    let at_five = comp.render(0.0).unwrap();
    assert_eq!(at_five.shape(), (1, 1));

    comp.set_preview_level(8).unwrap();
    fresh.set_preview_level(8).unwrap();
    let at_eight = comp.render(0.0).unwrap();
    assert!(!Arc::ptr_eq(&at_five, &at_eight));
    assert_eq!(*at_eight, *fresh.render(0.0).unwrap());
    assert_ne!(*at_eight, *at_five);
    assert_eq!(comp.cache_stats().unwrap().hits, 0);
}

#[test]
fn resolution_mismatch_recomputes() {
    let mut comp = comp_with(&["a"]);
    let key = comp.get_key(0.0);
    assert_eq!(comp.render(0.0).unwrap().shape(), (8, 8));

    comp.set_size((4, 4)).unwrap();
    assert_eq!(comp.get_key(0.0), key);
    assert_eq!(comp.render(0.0).unwrap().shape(), (4, 4));
    assert_eq!(comp.cache_stats().unwrap().invalidations, 1);
    assert_eq!(comp.cache_len().unwrap(), 1);
}

#[test]
fn render_errors_propagate_and_cache_nothing() {
    let mut comp = comp_with(&["a"]);
    comp.add_layer(Failing, LayerOpts::named("bad")).unwrap();
    assert!(matches!(
        comp.render(0.0),
        Err(StratumError::Evaluation(_))
    ));
    assert_eq!(comp.cache_len().unwrap(), 0);
}

#[test]
fn malformed_layer_frame_is_an_error() {
    let mut comp = comp_with(&["a"]);
    comp.add_layer(
        FnLayer::new(1.0, |_| {
            Some(FrameRGBA {
                width: 4,
                height: 4,
                data: vec![0; 8],
            })
        }),
        LayerOpts::named("short"),
    )
    .unwrap();
    assert!(matches!(
        comp.render(0.0),
        Err(StratumError::Evaluation(_))
    ));
    assert_eq!(comp.cache_len().unwrap(), 0);
}

#[test]
fn far_away_layer_renders_nothing() {
    let mut comp = Composition::new((4, 4), 1.0).unwrap();
    let opts = LayerOpts {
        transform: Some(Transform::at(Vec2::new(1e19, 0.0))),
        origin_point: Origin::TopLeft,
        ..LayerOpts::default()
    };
    comp.add_layer(solid(2, 2), opts).unwrap();
    assert!(comp.render(0.0).unwrap().is_fully_transparent());
}

#[test]
fn matte_linking_validates_before_mutating() {
    let mut comp = comp_with(&["a", "b", "c"]);
    assert!(matches!(
        comp.enable_alpha_matte("a", "a"),
        Err(StratumError::Validation(_))
    ));
    assert!(matches!(
        comp.enable_alpha_matte("a", "missing"),
        Err(StratumError::NotFound(_))
    ));
    assert!(matches!(
        comp.enable_alpha_matte("missing", "a"),
        Err(StratumError::NotFound(_))
    ));
    assert_eq!(comp.len(), 3);

    let source = comp.enable_alpha_matte("a", "b").unwrap();
    assert_eq!(source.alpha_matte().unwrap().name(), "b");
    assert_eq!(comp.names().collect::<Vec<_>>(), vec!["a", "c"]);
    assert!(!comp.contains("b"));

    let err = comp.enable_alpha_matte("a", "c").unwrap_err();
    assert!(matches!(
        &err,
        StratumError::MatteAlreadyLinked { source_name, target: None } if source_name == "a"
    ));
    assert!(err.into_rejected_matte().is_none());
    assert!(comp.contains("c"));
    assert_eq!(comp.names().collect::<Vec<_>>(), vec!["a", "c"]);
    assert_eq!(comp.get("a").unwrap().alpha_matte().unwrap().name(), "b");
}

#[test]
fn disabling_matte_does_not_reinsert() {
    let mut comp = comp_with(&["a", "b"]);
    comp.enable_alpha_matte("a", "b").unwrap();
    let target = comp.disable_alpha_matte("a").unwrap().unwrap();
    assert_eq!(target.name(), "b");
    assert!(!comp.contains("b"));
    assert!(comp.disable_alpha_matte("a").unwrap().is_none());
    assert!(comp.disable_alpha_matte("nope").is_err());
}

#[test]
fn nested_composition_keys_follow_inner_state() {
    let mut inner = comp_with(&["a"]);
    let k0 = Layer::content_key(&inner, 0.0);
    inner.get_mut("a").unwrap().transform_mut().position = Vec2::new(1.0, 1.0);
    let k1 = Layer::content_key(&inner, 0.0);
    assert_ne!(k0, k1);

    let frame = Layer::render(&inner, 0.0).unwrap().unwrap();
    assert_eq!(frame.shape(), (8, 8));
    assert_eq!(Layer::duration(&inner), 2.0);
}

#[test]
fn fn_layers_render_per_time() {
    let mut comp = Composition::new((2, 2), 1.0).unwrap();
    comp.add_layer(
        FnLayer::new(1.0, |t| {
            let v = (t * 100.0) as u8;
            Some(FrameRGBA::from_premul(2, 2, [v, v, v, 255].repeat(4)).unwrap())
        }),
        LayerOpts::default(),
    )
    .unwrap();
    assert_eq!(comp.render(0.1).unwrap().pixel(0, 0), Some([10, 10, 10, 255]));
    assert_eq!(comp.render(0.2).unwrap().pixel(0, 0), Some([20, 20, 20, 255]));
    assert_eq!(comp.cache_stats().unwrap().hits, 0);
}

#[test]
fn display_lists_layers() {
    let comp = comp_with(&["bg", "fg"]);
    assert_eq!(
        comp.to_string(),
        "Composition(size=(8, 8), duration=2, layers=[\"bg\", \"fg\"])"
    );
}
