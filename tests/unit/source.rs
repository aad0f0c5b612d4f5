use super::*;

struct TestSource {
    name: String,
}

impl VideoSource for TestSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn width(&self) -> u32 {
        4
    }

    fn height(&self) -> u32 {
        4
    }

    fn color_space(&self, _preferred: &[ColorSpace]) -> ColorSpace {
        ColorSpace::Srgb
    }

    fn output_flags(&self) -> OutputFlags {
        OutputFlags { srgb: true }
    }

    fn render(&mut self, _gfx: &mut Gfx, target: &mut SurfaceMut<'_>) -> DynamaskResult<()> {
        target.fill([1.0, 0.0, 0.0, 1.0]);
        Ok(())
    }
}

fn directory_with(names: &[&str]) -> SourceDirectory {
    let mut dir = SourceDirectory::new();
    for name in names {
        dir.register(Rc::new(RefCell::new(TestSource {
            name: (*name).to_string(),
        })))
        .unwrap();
    }
    dir
}

#[test]
fn register_rejects_empty_and_duplicate_names() {
    let mut dir = directory_with(&["camera"]);

    let dup = dir.register(Rc::new(RefCell::new(TestSource {
        name: "camera".to_string(),
    })));
    assert!(matches!(dup.unwrap_err(), DynamaskError::Validation(_)));

    let unnamed = dir.register(Rc::new(RefCell::new(TestSource {
        name: String::new(),
    })));
    assert!(matches!(unnamed.unwrap_err(), DynamaskError::Validation(_)));
}

#[test]
fn resolve_finds_registered_sources_by_name() {
    let dir = directory_with(&["camera", "overlay"]);
    assert_eq!(dir.resolve("overlay").map(|s| s.name().to_string()), Some("overlay".into()));
    assert!(dir.resolve("missing").is_none());
}

#[test]
fn link_child_rejects_self_reference() {
    let dir = directory_with(&["camera"]);
    let camera = dir.resolve("camera").unwrap();
    assert!(dir.link_child("camera", &camera).is_err());
}

#[test]
fn link_child_rejects_transitive_cycles() {
    let dir = directory_with(&["a", "b", "c"]);
    let b = dir.resolve("b").unwrap();
    let c = dir.resolve("c").unwrap();
    let _ab = dir.link_child("a", &b).unwrap();
    let _bc = dir.link_child("b", &c).unwrap();

    // c already renders through a -> b -> c.
    let a = dir.resolve("a").unwrap();
    assert!(dir.link_child("c", &a).is_err());
}

#[test]
fn host_links_participate_in_cycle_detection() {
    let dir = directory_with(&["scene", "camera"]);
    dir.add_link("scene", "camera");
    let scene = dir.resolve("scene").unwrap();
    assert!(dir.link_child("camera", &scene).is_err());
}

#[test]
fn dropping_the_link_guard_unregisters_it() {
    let dir = directory_with(&["a", "b"]);
    let b = dir.resolve("b").unwrap();
    let a = dir.resolve("a").unwrap();

    let ab = dir.link_child("a", &b).unwrap();
    assert!(dir.link_child("b", &a).is_err());
    drop(ab);
    assert!(dir.link_child("b", &a).is_ok());
}

#[test]
fn reference_guards_balance_the_counters() {
    let dir = directory_with(&["camera"]);
    let camera = dir.resolve("camera").unwrap();

    let s1 = camera.add_showing_ref();
    let s2 = camera.add_showing_ref();
    let a1 = camera.add_active_ref();
    assert_eq!(dir.showing_count("camera"), 2);
    assert_eq!(dir.active_count("camera"), 1);

    drop(s1);
    assert_eq!(dir.showing_count("camera"), 1);
    drop(s2);
    drop(a1);
    assert_eq!(dir.showing_count("camera"), 0);
    assert_eq!(dir.active_count("camera"), 0);
}

#[test]
fn counters_for_unknown_sources_read_zero() {
    let dir = directory_with(&[]);
    assert_eq!(dir.showing_count("ghost"), 0);
    assert_eq!(dir.active_count("ghost"), 0);
}
