//! The opaque shader-program contract and the two built-in programs.

use rayon::iter::ParallelIterator;

use crate::foundation::core::{Mat4, Vec4, dot4};
use crate::foundation::error::{DynamaskError, DynamaskResult};
use crate::gfx::state::Gfx;
use crate::gfx::target::SurfaceMut;
use crate::gfx::texture::{Texture, srgb_decode_texel, srgb_encode_texel};

/// Opaque shader program consumed through named parameters and techniques.
///
/// This is the contract the filter stage holds against the host's effect
/// system: it binds textures and uniform values by name and executes a named
/// technique as a full-screen pass over the current target. The program's
/// internal instruction sequence is not this crate's concern.
pub trait ShaderProgram {
    /// Whether the program exposes a parameter with this name.
    fn has_param(&self, name: &str) -> bool;

    /// Bind a texture parameter; `srgb` selects the sRGB-decoding sampler.
    fn set_texture(&mut self, name: &str, texture: &Texture, srgb: bool) -> DynamaskResult<()>;

    /// Bind a 4-vector uniform.
    fn set_float4(&mut self, name: &str, value: Vec4) -> DynamaskResult<()>;

    /// Bind a 4×4 matrix uniform.
    fn set_matrix4(&mut self, name: &str, value: Mat4) -> DynamaskResult<()>;

    /// Execute a named technique as a full-screen pass into `target`.
    fn run(&mut self, technique: &str, gfx: &Gfx, target: &mut SurfaceMut<'_>)
    -> DynamaskResult<()>;
}

fn unknown_param(program: &str, name: &str) -> DynamaskError {
    DynamaskError::shader_parameter(format!("program '{program}' has no parameter '{name}'"))
}

fn unbound_param(program: &str, name: &str) -> DynamaskError {
    DynamaskError::shader_parameter(format!("program '{program}' parameter '{name}' is not bound"))
}

#[derive(Clone, Debug)]
struct BoundTexture {
    texture: Texture,
    srgb: bool,
}

impl BoundTexture {
    /// Nearest sample at normalized coordinates, decoded to linear if the
    /// binding requested the sRGB sampler.
    fn sample(&self, u: f32, v: f32) -> Vec4 {
        let t = self.texture.sample(u, v);
        if self.srgb { srgb_decode_texel(t) } else { t }
    }
}

/// Built-in channel-mix program (technique `"Mask"`).
///
/// Parameters: textures `mask_a` (base capture) and `mask_b` (secondary
/// capture), uniforms `mask_offset`, `mask_matrix`, `mask_scale`.
///
/// The pass computes, per output channel `c`:
///
/// ```text
/// out[c] = offset[c] + scale[c] * Σ_i matrix[c][i] * b[i]
/// ```
///
/// i.e. the output is a pure affine function of the secondary input. The base
/// input fixes the pass geometry and color space and is available to
/// replacement mask programs; the built-in formula does not read it.
#[derive(Debug, Default)]
pub struct ChannelMaskProgram {
    input_a: Option<BoundTexture>,
    input_b: Option<BoundTexture>,
    offset: Vec4,
    matrix: Mat4,
    scale: Vec4,
}

impl ChannelMaskProgram {
    /// New program with all-zero uniforms and no textures bound.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ShaderProgram for ChannelMaskProgram {
    fn has_param(&self, name: &str) -> bool {
        matches!(
            name,
            "mask_a" | "mask_b" | "mask_offset" | "mask_matrix" | "mask_scale"
        )
    }

    fn set_texture(&mut self, name: &str, texture: &Texture, srgb: bool) -> DynamaskResult<()> {
        let bound = BoundTexture {
            texture: texture.clone(),
            srgb,
        };
        match name {
            "mask_a" => self.input_a = Some(bound),
            "mask_b" => self.input_b = Some(bound),
            _ => return Err(unknown_param("channel-mask", name)),
        }
        Ok(())
    }

    fn set_float4(&mut self, name: &str, value: Vec4) -> DynamaskResult<()> {
        match name {
            "mask_offset" => self.offset = value,
            "mask_scale" => self.scale = value,
            _ => return Err(unknown_param("channel-mask", name)),
        }
        Ok(())
    }

    fn set_matrix4(&mut self, name: &str, value: Mat4) -> DynamaskResult<()> {
        if name != "mask_matrix" {
            return Err(unknown_param("channel-mask", name));
        }
        self.matrix = value;
        Ok(())
    }

    fn run(
        &mut self,
        technique: &str,
        gfx: &Gfx,
        target: &mut SurfaceMut<'_>,
    ) -> DynamaskResult<()> {
        if technique != "Mask" {
            return Err(DynamaskError::shader_parameter(format!(
                "channel-mask program has no technique '{technique}'"
            )));
        }
        if self.input_a.is_none() {
            return Err(unbound_param("channel-mask", "mask_a"));
        }
        let Some(input_b) = self.input_b.clone() else {
            return Err(unbound_param("channel-mask", "mask_b"));
        };

        let (w, h) = (target.width(), target.height());
        let offset = self.offset;
        let matrix = self.matrix;
        let scale = self.scale;
        let encode = gfx.framebuffer_srgb();
        let write = gfx.state().color_write;

        target.par_rows_mut().for_each(|(y, row)| {
            let v = (y as f32 + 0.5) / h as f32;
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                let u = (x as f32 + 0.5) / w as f32;
                let b = input_b.sample(u, v);
                let mut out = [0.0f32; 4];
                for c in 0..4 {
                    out[c] = offset[c] + scale[c] * dot4(matrix[c], b);
                }
                if encode {
                    out = srgb_encode_texel(out);
                }
                for c in 0..4 {
                    if write[c] {
                        px[c] = out[c];
                    }
                }
            }
        });

        Ok(())
    }
}

/// Built-in output blit program (technique `"Draw"`).
///
/// Exposes the conventional `"image"` texture parameter and draws it across
/// the current target, honoring the host's blend state: source-over when
/// blending is enabled, replace otherwise.
#[derive(Debug, Default)]
pub struct DrawProgram {
    image: Option<BoundTexture>,
}

impl DrawProgram {
    /// New program with no image bound.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ShaderProgram for DrawProgram {
    fn has_param(&self, name: &str) -> bool {
        name == "image"
    }

    fn set_texture(&mut self, name: &str, texture: &Texture, srgb: bool) -> DynamaskResult<()> {
        if name != "image" {
            return Err(unknown_param("draw", name));
        }
        self.image = Some(BoundTexture {
            texture: texture.clone(),
            srgb,
        });
        Ok(())
    }

    fn set_float4(&mut self, name: &str, _value: Vec4) -> DynamaskResult<()> {
        Err(unknown_param("draw", name))
    }

    fn set_matrix4(&mut self, name: &str, _value: Mat4) -> DynamaskResult<()> {
        Err(unknown_param("draw", name))
    }

    fn run(
        &mut self,
        technique: &str,
        gfx: &Gfx,
        target: &mut SurfaceMut<'_>,
    ) -> DynamaskResult<()> {
        if technique != "Draw" {
            return Err(DynamaskError::shader_parameter(format!(
                "draw program has no technique '{technique}'"
            )));
        }
        let Some(image) = self.image.clone() else {
            return Err(unbound_param("draw", "image"));
        };

        let (w, h) = (target.width(), target.height());
        let blend = gfx.state().blend_enabled;
        let encode = gfx.framebuffer_srgb();
        let write = gfx.state().color_write;

        target.par_rows_mut().for_each(|(y, row)| {
            let v = (y as f32 + 0.5) / h as f32;
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                let u = (x as f32 + 0.5) / w as f32;
                let src = image.sample(u, v);
                let dst = [px[0], px[1], px[2], px[3]];
                let mut out = if blend {
                    let sa = src[3].clamp(0.0, 1.0);
                    [
                        src[0] * sa + dst[0] * (1.0 - sa),
                        src[1] * sa + dst[1] * (1.0 - sa),
                        src[2] * sa + dst[2] * (1.0 - sa),
                        sa + dst[3] * (1.0 - sa),
                    ]
                } else {
                    src
                };
                if encode {
                    out = srgb_encode_texel(out);
                }
                for c in 0..4 {
                    if write[c] {
                        px[c] = out[c];
                    }
                }
            }
        });

        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/gfx/program.rs"]
mod tests;
