//! Acquire/release lifecycle for the externally-selected secondary source.

use crate::foundation::error::{DynamaskError, DynamaskResult};
use crate::source::{ActiveRef, ChildLink, ResolvedSource, ShowingRef, SourceDirectory};

/// A successfully acquired secondary source with its bookkeeping guards.
#[derive(Debug)]
struct BoundSource {
    source: ResolvedSource,
    // Keeps the cycle-checked render link registered while bound.
    _child: ChildLink,
    showing: Option<ShowingRef>,
    active: Option<ActiveRef>,
}

/// Binding to the externally-selected secondary source.
///
/// One value type holds the non-owning lookup name, the lazily resolved
/// handle, and the cycle-check link; visibility/activity references are
/// forwarded to the bound source only while the owning filter is itself
/// shown/active, and every reference is dropped exactly once on release or
/// rebinding.
#[derive(Debug)]
pub struct SecondaryBinding {
    owner: String,
    name: String,
    bound: Option<BoundSource>,
}

impl SecondaryBinding {
    /// New unbound state for a filter identified by `owner`.
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: String::new(),
            bound: None,
        }
    }

    /// The configured lookup name (empty = no secondary selected).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The resolved source, when the binding is live.
    pub fn source(&self) -> Option<&ResolvedSource> {
        self.bound.as_ref().map(|b| &b.source)
    }

    /// Change the bound name: release the current binding, then acquire the
    /// new source if the name is non-empty.
    ///
    /// `shown`/`active` describe the owning filter's current state and decide
    /// whether visibility/activity references are forwarded. On any failure
    /// the binding is left in the same state as "no secondary selected".
    pub fn rebind(
        &mut self,
        directory: &SourceDirectory,
        name: &str,
        shown: bool,
        active: bool,
    ) -> DynamaskResult<()> {
        self.release();
        self.name = name.to_string();
        if self.name.is_empty() {
            return Ok(());
        }
        self.acquire(directory, shown, active)
    }

    fn acquire(
        &mut self,
        directory: &SourceDirectory,
        shown: bool,
        active: bool,
    ) -> DynamaskResult<()> {
        let Some(source) = directory.resolve(&self.name) else {
            return Err(DynamaskError::binding(format!(
                "secondary source '{}' not found",
                self.name
            )));
        };

        // Rejects self-reference and transitive render cycles at bind time.
        let child = directory.link_child(&self.owner, &source)?;

        let showing = shown.then(|| source.add_showing_ref());
        let active = active.then(|| source.add_active_ref());
        self.bound = Some(BoundSource {
            source,
            _child: child,
            showing,
            active,
        });
        Ok(())
    }

    /// Drop the source reference and all forwarded references; idempotent.
    pub fn release(&mut self) {
        self.bound = None;
    }

    /// Forward a visibility reference while the owning filter is shown.
    pub fn on_show(&mut self) {
        if let Some(bound) = &mut self.bound
            && bound.showing.is_none()
        {
            bound.showing = Some(bound.source.add_showing_ref());
        }
    }

    /// Drop the forwarded visibility reference.
    pub fn on_hide(&mut self) {
        if let Some(bound) = &mut self.bound {
            bound.showing = None;
        }
    }

    /// Forward an activity reference while the owning filter is active.
    pub fn on_activate(&mut self) {
        if let Some(bound) = &mut self.bound
            && bound.active.is_none()
        {
            bound.active = Some(bound.source.add_active_ref());
        }
    }

    /// Drop the forwarded activity reference.
    pub fn on_deactivate(&mut self) {
        if let Some(bound) = &mut self.bound {
            bound.active = None;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/filter/binding.rs"]
mod tests;
