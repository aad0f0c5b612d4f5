//! Shared shader programs owned by the plugin's top-level context.
//!
//! The registry is created once at plugin init, handed to each engine
//! instance at construction, and torn down with the context — no ambient
//! globals are involved.

use std::cell::RefCell;
use std::rc::Rc;

use crate::gfx::program::{ChannelMaskProgram, DrawProgram, ShaderProgram};

/// Process-wide effect registry for the filter stage's built-in programs.
pub struct EffectRegistry {
    mask: Rc<RefCell<dyn ShaderProgram>>,
    draw: Rc<RefCell<dyn ShaderProgram>>,
}

impl EffectRegistry {
    /// Load the built-in channel-mask and output-draw programs.
    pub fn new() -> Self {
        Self {
            mask: Rc::new(RefCell::new(ChannelMaskProgram::new())),
            draw: Rc::new(RefCell::new(DrawProgram::new())),
        }
    }

    /// The shared channel-mask program.
    pub fn mask_program(&self) -> Rc<RefCell<dyn ShaderProgram>> {
        Rc::clone(&self.mask)
    }

    /// The default output-draw program.
    pub fn draw_program(&self) -> Rc<RefCell<dyn ShaderProgram>> {
        Rc::clone(&self.draw)
    }
}

impl Default for EffectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EffectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectRegistry").finish_non_exhaustive()
    }
}
