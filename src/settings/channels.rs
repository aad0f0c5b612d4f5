//! Per-channel mix parameters, their key layout, and the packed transform.

use crate::foundation::core::{Channel, Mat4, Vec4};
use crate::settings::store::SettingsStore;

/// Per-output-channel mix parameters.
///
/// `offset` and `scale` shape the affine result; `weights[i]` is the
/// contribution of secondary-stream channel `i`. Values are unconstrained
/// finite floats — the UI suggests a slider range, the core never clamps.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChannelSettings {
    /// Additive offset for this output channel.
    pub offset: f32,
    /// Multiplier applied to the weighted sum.
    pub scale: f32,
    /// Weight per secondary-stream channel, indexed by [`Channel::idx`].
    pub weights: [f32; 4],
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            offset: 0.0,
            scale: 1.0,
            weights: [0.0; 4],
        }
    }
}

/// Packed transform consumed by the mask program.
///
/// Always a pure function of the current [`ChannelSettings`]: row `c` of
/// `matrix` equals the weights of output channel `c`, and the vectors hold
/// the per-channel offsets and scales. Never partially stale.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MixTransform {
    /// One offset per output channel.
    pub offset: Vec4,
    /// One scale per output channel.
    pub scale: Vec4,
    /// Row `c` = weights of output channel `c` over the secondary channels.
    pub matrix: Mat4,
}

impl Default for MixTransform {
    fn default() -> Self {
        MixTransform::from(&[ChannelSettings::default(); 4])
    }
}

impl From<&[ChannelSettings; 4]> for MixTransform {
    fn from(channels: &[ChannelSettings; 4]) -> Self {
        let mut t = MixTransform {
            offset: [0.0; 4],
            scale: [0.0; 4],
            matrix: [[0.0; 4]; 4],
        };
        for c in 0..4 {
            t.offset[c] = channels[c].offset;
            t.scale[c] = channels[c].scale;
            t.matrix[c] = channels[c].weights;
        }
        t
    }
}

/// Settings-key helpers for the persisted per-channel layout.
pub mod keys {
    use crate::foundation::core::Channel;

    /// Secondary source name.
    pub const INPUT: &str = "input";
    /// Debug override selector (−1 none / 0 base / 1 secondary).
    pub const DEBUG_VIEW: &str = "debug.texture";

    /// Offset key for an output channel.
    pub fn value(out: Channel) -> String {
        format!("channel.value.{}", out.key())
    }

    /// Scale key for an output channel.
    pub fn multiplier(out: Channel) -> String {
        format!("channel.multiplier.{}", out.key())
    }

    /// Weight key for an (output, secondary-input) channel pair.
    pub fn input(out: Channel, sec: Channel) -> String {
        format!("channel.input.{}.{}", out.key(), sec.key())
    }
}

/// The full set of channel-mix parameters plus their derived transform.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChannelMixParams {
    channels: [ChannelSettings; 4],
    transform: MixTransform,
}

impl ChannelMixParams {
    /// New parameters with default (all-zero weights, unit scale) settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings for one output channel.
    pub fn channel(&self, out: Channel) -> ChannelSettings {
        self.channels[out.idx()]
    }

    /// Replace the settings of one output channel and recompute the
    /// transform immediately.
    pub fn set_channel(&mut self, out: Channel, settings: ChannelSettings) {
        self.channels[out.idx()] = settings;
        self.transform = MixTransform::from(&self.channels);
    }

    /// The packed transform; never stale relative to the settings.
    pub fn transform(&self) -> &MixTransform {
        &self.transform
    }

    /// Read all channel settings from the flat store.
    ///
    /// Total function: missing offsets and weights default to 0.0, missing
    /// scales to the neutral 1.0. Any finite float is accepted unclamped.
    pub fn update(&mut self, store: &SettingsStore) {
        for out in Channel::ALL {
            let ch = &mut self.channels[out.idx()];
            ch.offset = store.get_f64(&keys::value(out), 0.0) as f32;
            ch.scale = store.get_f64(&keys::multiplier(out), 1.0) as f32;
            for sec in Channel::ALL {
                ch.weights[sec.idx()] = store.get_f64(&keys::input(out, sec), 0.0) as f32;
            }
        }
        self.transform = MixTransform::from(&self.channels);
    }

    /// Write all channel settings back to the flat store (inverse of
    /// [`ChannelMixParams::update`]; numeric values round-trip exactly).
    pub fn serialize(&self, store: &mut SettingsStore) {
        for out in Channel::ALL {
            let ch = &self.channels[out.idx()];
            store.set_f64(&keys::value(out), f64::from(ch.offset));
            store.set_f64(&keys::multiplier(out), f64::from(ch.scale));
            for sec in Channel::ALL {
                store.set_f64(&keys::input(out, sec), f64::from(ch.weights[sec.idx()]));
            }
        }
    }

    /// Write the factory defaults the host presents for a fresh filter:
    /// unit offset and scale, zero weights, debug override disabled.
    pub fn defaults(store: &mut SettingsStore) {
        for out in Channel::ALL {
            store.set_f64(&keys::value(out), 1.0);
            store.set_f64(&keys::multiplier(out), 1.0);
            for sec in Channel::ALL {
                store.set_f64(&keys::input(out, sec), 0.0);
            }
        }
        store.set_i64(keys::DEBUG_VIEW, -1);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/settings/channels.rs"]
mod tests;
