use std::collections::HashMap;

use crate::color::Hsv;
use crate::error::{EngineError, Result};

pub type PaletteIndex = u32;

/// A decoded texture as handed over by the asset collaborator.
/// Pixels are row-major packed ARGB.
#[derive(Debug, Clone)]
pub struct RawTexture {
    pub name: String,
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u32>,
}

impl RawTexture {
    pub fn new(name: impl Into<String>, width: usize, height: usize, pixels: Vec<u32>) -> Result<Self> {
        let texture = Self {
            name: name.into(),
            width,
            height,
            pixels,
        };
        texture.validate()?;
        Ok(texture)
    }

    /// Builds a texture pixel by pixel from `f(x, y)`.
    pub fn generate(
        name: impl Into<String>,
        width: usize,
        height: usize,
        f: impl Fn(usize, usize) -> u32,
    ) -> Result<Self> {
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self::new(name, width, height, pixels)
    }

    /// Non-empty, with exactly `width * height` pixels. The fields are public,
    /// so the image library checks this again before indexing.
    pub fn validate(&self) -> Result<()> {
        let expected = self.width * self.height;
        if expected == 0 || self.pixels.len() != expected {
            return Err(EngineError::TextureSize {
                name: self.name.clone(),
                expected,
                actual: self.pixels.len(),
            });
        }
        Ok(())
    }

    fn recolor(&self, variant: &TextureVariant) -> Self {
        let pixels = self
            .pixels
            .iter()
            .map(|&color| {
                Hsv::from_argb(color)
                    .adjust(
                        variant.hue_shift,
                        variant.saturation_scale,
                        variant.value_scale,
                    )
                    .to_argb()
            })
            .collect();
        Self {
            name: variant.name.clone(),
            width: self.width,
            height: self.height,
            pixels,
        }
    }
}

/// A recoloured copy of another texture, produced at load time.
#[derive(Debug, Clone)]
pub struct TextureVariant {
    pub name: String,
    pub source: String,
    pub hue_shift: f32,
    pub saturation_scale: f32,
    pub value_scale: f32,
}

impl TextureVariant {
    pub fn darkened(source: &str, value_scale: f32) -> Self {
        Self {
            name: format!("{source}_dark"),
            source: source.to_owned(),
            hue_shift: 0.0,
            saturation_scale: 1.0,
            value_scale,
        }
    }

    pub(crate) fn apply(&self, textures: &[RawTexture]) -> Result<RawTexture> {
        textures
            .iter()
            .find(|t| t.name == self.source)
            .map(|t| t.recolor(self))
            .ok_or_else(|| EngineError::MissingTexture {
                name: self.source.clone(),
            })
    }
}

/// Palette indices of a texture, stored column first so a wall strip reads
/// one contiguous slice.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedColorTexture {
    width: usize,
    height: usize,
    indices: Vec<PaletteIndex>,
}

impl IndexedColorTexture {
    pub fn new(width: usize, height: usize, column_major: Vec<PaletteIndex>) -> Result<Self> {
        let expected = width * height;
        if expected == 0 || column_major.len() != expected {
            return Err(EngineError::TextureSize {
                name: "<indexed>".to_owned(),
                expected,
                actual: column_major.len(),
            });
        }
        Ok(Self {
            width,
            height,
            indices: column_major,
        })
    }

    pub(crate) fn from_raw(raw: &RawTexture, color_to_index: &HashMap<u32, PaletteIndex>) -> Self {
        let mut indices = vec![0; raw.width * raw.height];
        for x in 0..raw.width {
            let column = &mut indices[x * raw.height..(x + 1) * raw.height];
            for (y, slot) in column.iter_mut().enumerate() {
                // every colour went through palette construction first
                *slot = color_to_index[&raw.pixels[y * raw.width + x]];
            }
        }
        Self {
            width: raw.width,
            height: raw.height,
            indices,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> PaletteIndex {
        self.indices[x * self.height + y]
    }

    #[inline]
    pub fn column(&self, x: usize) -> &[PaletteIndex] {
        &self.indices[x * self.height..(x + 1) * self.height]
    }

    /// Sample with wrap-around, for floor and ceiling tiling.
    #[inline]
    pub fn get_wrapped(&self, x: i64, y: i64) -> PaletteIndex {
        let x = x.rem_euclid(self.width as i64) as usize;
        let y = y.rem_euclid(self.height as i64) as usize;
        self.get(x, y)
    }
}
