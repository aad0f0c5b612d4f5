//! Host-facing source contracts: the upstream filter target, addressable
//! video sources, and the directory that resolves names, tracks render
//! parent/child links for cycle detection, and carries per-source
//! visibility/activity reference counts.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::foundation::core::{ColorSpace, OutputFlags};
use crate::foundation::error::{DynamaskError, DynamaskResult};
use crate::gfx::state::Gfx;
use crate::gfx::target::SurfaceMut;

/// The filter's upstream target: whatever the preceding filter chain renders.
pub trait FilterTarget {
    /// Base (unscaled) output width.
    fn base_width(&self) -> u32;

    /// Base (unscaled) output height.
    fn base_height(&self) -> u32;

    /// Color space the target would produce given the preferred candidates.
    fn color_space(&self, preferred: &[ColorSpace]) -> ColorSpace;

    /// Declared output capability flags.
    fn output_flags(&self) -> OutputFlags;

    /// Render the upstream chain into the given surface.
    fn render_into(&mut self, gfx: &mut Gfx, target: &mut SurfaceMut<'_>) -> DynamaskResult<()>;
}

/// An addressable video source the filter may select as its secondary input.
pub trait VideoSource {
    /// Stable lookup name.
    fn name(&self) -> &str;

    /// Current output width.
    fn width(&self) -> u32;

    /// Current output height.
    fn height(&self) -> u32;

    /// Color space the source would produce given the preferred candidates.
    fn color_space(&self, preferred: &[ColorSpace]) -> ColorSpace;

    /// Declared output capability flags.
    fn output_flags(&self) -> OutputFlags;

    /// Render the source's own content into the given surface.
    fn render(&mut self, gfx: &mut Gfx, target: &mut SurfaceMut<'_>) -> DynamaskResult<()>;
}

/// Shared handle to a registered video source.
pub type SourceHandle = Rc<RefCell<dyn VideoSource>>;

struct SourceEntry {
    name: String,
    handle: SourceHandle,
    showing: Cell<u32>,
    active: Cell<u32>,
}

impl std::fmt::Debug for SourceEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The trait-object handle has no Debug; print the counters only.
        f.debug_struct("SourceEntry")
            .field("name", &self.name)
            .field("showing", &self.showing.get())
            .field("active", &self.active.get())
            .finish()
    }
}

type LinkTable = Rc<RefCell<Vec<(String, String)>>>;

/// Name → source resolution, render-link bookkeeping, and reference counting,
/// owned by the host.
///
/// Render links record "owner renders child" relationships; a bind attempt
/// that would make the owner reachable from the candidate child is rejected
/// as a render cycle.
#[derive(Debug, Default)]
pub struct SourceDirectory {
    entries: Vec<Rc<SourceEntry>>,
    links: LinkTable,
}

impl SourceDirectory {
    /// New empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source under its own reported name.
    ///
    /// Names are the directory's keys: an empty or already-taken name makes
    /// every later lookup ambiguous and is rejected up front.
    pub fn register(&mut self, source: SourceHandle) -> DynamaskResult<()> {
        let name = source.borrow().name().to_string();
        if name.is_empty() {
            return Err(DynamaskError::validation(
                "cannot register a source with an empty name",
            ));
        }
        if self.entries.iter().any(|e| e.name == name) {
            return Err(DynamaskError::validation(format!(
                "a source named '{name}' is already registered"
            )));
        }
        self.entries.push(Rc::new(SourceEntry {
            name,
            handle: source,
            showing: Cell::new(0),
            active: Cell::new(0),
        }));
        Ok(())
    }

    /// Resolve a name to a live source reference.
    pub fn resolve(&self, name: &str) -> Option<ResolvedSource> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| ResolvedSource(Rc::clone(e)))
    }

    /// Declare a render link from `owner` to `child` without a cycle check.
    ///
    /// Hosts use this to describe existing scene composition; the filter's
    /// own binding goes through [`SourceDirectory::link_child`].
    pub fn add_link(&self, owner: &str, child: &str) {
        self.links.borrow_mut().push((owner.to_string(), child.to_string()));
    }

    /// Register a cycle-checked render link from `owner` to the resolved
    /// child; the link is removed when the returned guard drops.
    pub fn link_child(&self, owner: &str, child: &ResolvedSource) -> DynamaskResult<ChildLink> {
        if self.reaches(child.name(), owner) {
            return Err(DynamaskError::binding(format!(
                "linking '{owner}' -> '{}' would create a render cycle",
                child.name()
            )));
        }
        self.links.borrow_mut().push((owner.to_string(), child.name().to_string()));
        Ok(ChildLink {
            links: Rc::clone(&self.links),
            owner: owner.to_string(),
            child: child.name().to_string(),
        })
    }

    /// Whether `to` is reachable from `from` over declared render links
    /// (including `from == to`).
    fn reaches(&self, from: &str, to: &str) -> bool {
        if from == to {
            return true;
        }
        let links = self.links.borrow();
        let mut queue = vec![from.to_string()];
        let mut seen = vec![from.to_string()];
        while let Some(cur) = queue.pop() {
            for (owner, child) in links.iter() {
                if *owner == cur && !seen.contains(child) {
                    if child == to {
                        return true;
                    }
                    seen.push(child.clone());
                    queue.push(child.clone());
                }
            }
        }
        false
    }

    /// Current visibility reference count for a named source (0 if unknown).
    pub fn showing_count(&self, name: &str) -> u32 {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map_or(0, |e| e.showing.get())
    }

    /// Current activity reference count for a named source (0 if unknown).
    pub fn active_count(&self, name: &str) -> u32 {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map_or(0, |e| e.active.get())
    }
}

/// A resolved, live reference to a directory entry.
#[derive(Clone, Debug)]
pub struct ResolvedSource(Rc<SourceEntry>);

impl ResolvedSource {
    /// The source's lookup name.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Shared handle to the underlying source.
    pub fn source(&self) -> SourceHandle {
        Rc::clone(&self.0.handle)
    }

    /// Take a visibility reference; released when the guard drops.
    pub fn add_showing_ref(&self) -> ShowingRef {
        self.0.showing.set(self.0.showing.get() + 1);
        ShowingRef(Rc::clone(&self.0))
    }

    /// Take an activity reference; released when the guard drops.
    pub fn add_active_ref(&self) -> ActiveRef {
        self.0.active.set(self.0.active.get() + 1);
        ActiveRef(Rc::clone(&self.0))
    }
}

/// Visibility reference; decrements exactly once on drop.
#[derive(Debug)]
pub struct ShowingRef(Rc<SourceEntry>);

impl Drop for ShowingRef {
    fn drop(&mut self) {
        self.0.showing.set(self.0.showing.get().saturating_sub(1));
    }
}

/// Activity reference; decrements exactly once on drop.
#[derive(Debug)]
pub struct ActiveRef(Rc<SourceEntry>);

impl Drop for ActiveRef {
    fn drop(&mut self) {
        self.0.active.set(self.0.active.get().saturating_sub(1));
    }
}

/// Render link registered through cycle detection; unregisters on drop.
#[derive(Debug)]
pub struct ChildLink {
    links: LinkTable,
    owner: String,
    child: String,
}

impl Drop for ChildLink {
    fn drop(&mut self) {
        let mut links = self.links.borrow_mut();
        if let Some(pos) = links
            .iter()
            .position(|(o, c)| *o == self.owner && *c == self.child)
        {
            links.remove(pos);
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/source.rs"]
mod tests;
