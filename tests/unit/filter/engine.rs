use super::*;

use std::cell::RefCell;

use crate::foundation::core::{ColorFormat, ColorSpace, Mat4, OutputFlags, Vec4};
use crate::gfx::target::SurfaceMut;
use crate::source::VideoSource;

struct TestTarget {
    width: u32,
    height: u32,
    texel: Vec4,
    renders: u32,
}

impl TestTarget {
    fn new(width: u32, height: u32, texel: Vec4) -> Self {
        Self {
            width,
            height,
            texel,
            renders: 0,
        }
    }
}

impl FilterTarget for TestTarget {
    fn base_width(&self) -> u32 {
        self.width
    }

    fn base_height(&self) -> u32 {
        self.height
    }

    fn color_space(&self, preferred: &[ColorSpace]) -> ColorSpace {
        preferred.first().copied().unwrap_or_default()
    }

    fn output_flags(&self) -> OutputFlags {
        OutputFlags { srgb: true }
    }

    fn render_into(&mut self, _gfx: &mut Gfx, target: &mut SurfaceMut<'_>) -> DynamaskResult<()> {
        self.renders += 1;
        target.fill(self.texel);
        Ok(())
    }
}

struct TestSource {
    name: String,
    texel: Vec4,
    renders: Rc<std::cell::Cell<u32>>,
}

impl VideoSource for TestSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn width(&self) -> u32 {
        2
    }

    fn height(&self) -> u32 {
        2
    }

    fn color_space(&self, preferred: &[ColorSpace]) -> ColorSpace {
        preferred.first().copied().unwrap_or_default()
    }

    fn output_flags(&self) -> OutputFlags {
        OutputFlags { srgb: true }
    }

    fn render(&mut self, _gfx: &mut Gfx, target: &mut SurfaceMut<'_>) -> DynamaskResult<()> {
        self.renders.set(self.renders.get() + 1);
        target.fill(self.texel);
        Ok(())
    }
}

fn register(dir: &mut SourceDirectory, name: &str, texel: Vec4) -> Rc<std::cell::Cell<u32>> {
    let renders = Rc::new(std::cell::Cell::new(0));
    dir.register(Rc::new(RefCell::new(TestSource {
        name: name.to_string(),
        texel,
        renders: Rc::clone(&renders),
    })))
    .unwrap();
    renders
}

fn new_engine() -> MaskEngine {
    MaskEngine::new("mask", Rc::new(EffectRegistry::new()))
}

fn new_host(w: u32, h: u32) -> RenderTarget {
    let mut host = RenderTarget::new(ColorFormat::Rgba8);
    host.resize(w, h);
    host
}

#[test]
fn debug_selector_codes_are_stable() {
    assert_eq!(DebugView::from_i64(-1), DebugView::None);
    assert_eq!(DebugView::from_i64(0), DebugView::Base);
    assert_eq!(DebugView::from_i64(1), DebugView::Secondary);
    assert_eq!(DebugView::from_i64(42), DebugView::None);
    for view in [DebugView::None, DebugView::Base, DebugView::Secondary] {
        assert_eq!(DebugView::from_i64(view.to_i64()), view);
    }
}

#[test]
fn zero_sized_targets_skip_without_touching_the_host() {
    let mut target = TestTarget::new(0, 0, [1.0; 4]);
    let mut gfx = Gfx::new();
    let mut engine = new_engine();
    let mut host = new_host(2, 2);
    host.surface().fill([0.5; 4]);

    engine.tick_update(&target);
    let result = engine.render(&mut gfx, &mut target, &mut host, None);
    assert_eq!(result, RenderResult::Skipped);
    assert_eq!(target.renders, 0);
    assert_eq!(host.surface().get(0, 0), [0.5; 4]);
}

#[test]
fn renders_within_one_tick_capture_upstream_once() {
    let mut target = TestTarget::new(2, 2, [0.25, 0.5, 0.75, 1.0]);
    let mut gfx = Gfx::new();
    let mut engine = new_engine();
    let mut host = new_host(2, 2);

    engine.tick_update(&target);
    assert_eq!(
        engine.render(&mut gfx, &mut target, &mut host, None),
        RenderResult::Drawn
    );
    assert_eq!(
        engine.render(&mut gfx, &mut target, &mut host, None),
        RenderResult::Drawn
    );
    assert_eq!(target.renders, 1);

    engine.tick_update(&target);
    engine.render(&mut gfx, &mut target, &mut host, None);
    assert_eq!(target.renders, 2);
}

#[test]
fn unbound_secondary_slot_is_the_same_view_as_the_base() {
    let mut target = TestTarget::new(2, 2, [0.25, 0.5, 0.75, 1.0]);
    let mut gfx = Gfx::new();
    let mut engine = new_engine();
    let mut host = new_host(2, 2);

    engine.tick_update(&target);
    engine.render(&mut gfx, &mut target, &mut host, None);

    assert!(engine.secondary.valid);
    let base = engine.base.texture().unwrap();
    let secondary = engine.secondary.texture().unwrap();
    assert!(secondary.same_view(base));
}

#[test]
fn debug_base_presents_the_base_capture() {
    let mut target = TestTarget::new(2, 2, [0.25, 0.5, 0.75, 1.0]);
    let mut gfx = Gfx::new();
    gfx.state_mut().blend_enabled = false;
    let mut engine = new_engine();
    engine.set_debug_override(DebugView::Base);
    let mut host = new_host(2, 2);

    engine.tick_update(&target);
    assert_eq!(
        engine.render(&mut gfx, &mut target, &mut host, None),
        RenderResult::Drawn
    );
    let out = host.surface().get(1, 1);
    for c in 0..4 {
        assert!((out[c] - [0.25, 0.5, 0.75, 1.0][c]).abs() <= 1.0 / 255.0);
    }
}

#[test]
fn secondary_capture_renders_the_bound_source_once_per_tick() {
    let mut dir = SourceDirectory::new();
    let renders = register(&mut dir, "cam", [1.0, 0.0, 0.0, 1.0]);

    let mut target = TestTarget::new(2, 2, [0.0; 4]);
    let mut gfx = Gfx::new();
    let mut engine = new_engine();
    engine.bind_secondary(&dir, "cam").unwrap();
    let mut host = new_host(2, 2);

    engine.tick_update(&target);
    engine.render(&mut gfx, &mut target, &mut host, None);
    engine.render(&mut gfx, &mut target, &mut host, None);
    assert_eq!(renders.get(), 1);

    engine.tick_update(&target);
    engine.render(&mut gfx, &mut target, &mut host, None);
    assert_eq!(renders.get(), 2);
}

#[test]
fn update_applies_settings_and_save_round_trips() {
    let mut dir = SourceDirectory::new();
    register(&mut dir, "cam", [0.0; 4]);

    let mut store = SettingsStore::new();
    store.set_str(keys::INPUT, "cam");
    store.set_i64(keys::DEBUG_VIEW, 1);
    store.set_f64(&keys::value(Channel::Red), 0.5);
    store.set_f64(&keys::input(Channel::Red, Channel::Alpha), 1.0);

    let mut engine = new_engine();
    engine.update(&dir, &store);
    assert_eq!(engine.secondary_name(), "cam");
    assert_eq!(engine.debug_override(), DebugView::Secondary);
    let red = engine.channel_settings(Channel::Red);
    assert_eq!(red.offset, 0.5);
    assert_eq!(red.weights[3], 1.0);

    let mut saved = SettingsStore::new();
    engine.save(&mut saved);
    let mut restored = new_engine();
    restored.update(&dir, &saved);
    assert_eq!(restored.secondary_name(), "cam");
    assert_eq!(restored.debug_override(), DebugView::Secondary);
    assert_eq!(restored.channel_settings(Channel::Red), red);
}

#[test]
fn update_with_an_unresolvable_name_keeps_it_for_saving() {
    let dir = SourceDirectory::new();
    let mut store = SettingsStore::new();
    store.set_str(keys::INPUT, "ghost");

    let mut engine = new_engine();
    engine.update(&dir, &store);
    assert_eq!(engine.secondary_name(), "ghost");
    let mut children = 0;
    engine.enumerate_children(|_| children += 1);
    assert_eq!(children, 0);

    let mut saved = SettingsStore::new();
    engine.save(&mut saved);
    assert_eq!(saved.get_str(keys::INPUT), "ghost");
}

#[test]
fn show_and_activate_forward_to_the_bound_source() {
    let mut dir = SourceDirectory::new();
    register(&mut dir, "cam", [0.0; 4]);

    let mut engine = new_engine();
    engine.show();
    engine.activate();
    engine.bind_secondary(&dir, "cam").unwrap();
    assert_eq!(dir.showing_count("cam"), 1);
    assert_eq!(dir.active_count("cam"), 1);

    engine.hide();
    engine.deactivate();
    assert_eq!(dir.showing_count("cam"), 0);
    assert_eq!(dir.active_count("cam"), 0);

    let mut children = 0;
    engine.enumerate_children(|child| {
        assert_eq!(child.name(), "cam");
        children += 1;
    });
    assert_eq!(children, 1);
}

struct NullProgram;

impl ShaderProgram for NullProgram {
    fn has_param(&self, _name: &str) -> bool {
        false
    }

    fn set_texture(&mut self, name: &str, _t: &Texture, _srgb: bool) -> DynamaskResult<()> {
        Err(DynamaskError::shader_parameter(name.to_string()))
    }

    fn set_float4(&mut self, name: &str, _v: Vec4) -> DynamaskResult<()> {
        Err(DynamaskError::shader_parameter(name.to_string()))
    }

    fn set_matrix4(&mut self, name: &str, _v: Mat4) -> DynamaskResult<()> {
        Err(DynamaskError::shader_parameter(name.to_string()))
    }

    fn run(&mut self, _t: &str, _g: &Gfx, _s: &mut SurfaceMut<'_>) -> DynamaskResult<()> {
        Ok(())
    }
}

#[test]
fn output_programs_without_an_image_parameter_skip() {
    let mut target = TestTarget::new(2, 2, [0.5; 4]);
    let mut gfx = Gfx::new();
    let mut engine = new_engine();
    let mut host = new_host(2, 2);

    engine.tick_update(&target);
    let mut program = NullProgram;
    let result = engine.render(&mut gfx, &mut target, &mut host, Some(&mut program));
    assert_eq!(result, RenderResult::Skipped);
}
