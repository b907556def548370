use std::collections::{HashMap, HashSet};

use log::{debug, info};

use crate::color::{Hsv, OPAQUE};
use crate::error::{EngineError, Result};
use crate::light::{FULL_BRIGHT, LIGHT_LEVEL_BITS, LIGHT_LEVELS, LightLevel};
use crate::texture::{IndexedColorTexture, PaletteIndex, RawTexture, TextureVariant};

/// Handle to a texture inside an [`ImageLibrary`], resolved once at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(u32);

/// Shared palette, light ramp and indexed textures.
///
/// Built once from raw textures and never mutated afterwards, so the renderer
/// can read it from every column at the same time.
pub struct ImageLibrary {
    palette: Vec<u32>,
    // palette.len() << LIGHT_LEVEL_BITS entries, one run of levels per colour
    color_ramp: Vec<u32>,
    textures: Vec<IndexedColorTexture>,
    names: HashMap<String, TextureId>,
}

impl ImageLibrary {
    pub fn new(raw: Vec<RawTexture>, variants: &[TextureVariant]) -> Result<Self> {
        for texture in &raw {
            texture.validate()?;
        }
        let mut all = raw;
        for variant in variants {
            let derived = variant.apply(&all)?;
            all.push(derived);
        }

        let mut names = HashMap::with_capacity(all.len());
        for (i, tex) in all.iter().enumerate() {
            if names.insert(tex.name.clone(), TextureId(i as u32)).is_some() {
                return Err(EngineError::DuplicateTexture {
                    name: tex.name.clone(),
                });
            }
        }

        let unique: HashSet<u32> = all.iter().flat_map(|t| t.pixels.iter().copied()).collect();
        if unique.is_empty() {
            return Err(EngineError::EmptyPalette);
        }
        let mut palette: Vec<u32> = unique.into_iter().collect();
        // stable indices across runs
        palette.sort_unstable();

        let color_to_index: HashMap<u32, PaletteIndex> = palette
            .iter()
            .enumerate()
            .map(|(i, &c)| (c, i as PaletteIndex))
            .collect();

        let color_ramp = build_color_ramp(&palette);
        let textures = all
            .iter()
            .map(|raw| IndexedColorTexture::from_raw(raw, &color_to_index))
            .collect();

        info!(
            "image library: {} textures, {} palette colours, {} ramp entries",
            all.len(),
            palette.len(),
            color_ramp.len()
        );
        for raw in &all {
            debug!("texture {} ({}x{})", raw.name, raw.width, raw.height);
        }

        Ok(Self {
            palette,
            color_ramp,
            textures,
            names,
        })
    }

    pub fn texture_id(&self, name: &str) -> Result<TextureId> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| EngineError::MissingTexture {
                name: name.to_owned(),
            })
    }

    #[inline]
    pub fn texture(&self, id: TextureId) -> &IndexedColorTexture {
        &self.textures[id.0 as usize]
    }

    pub fn texture_by_name(&self, name: &str) -> Result<&IndexedColorTexture> {
        self.texture_id(name).map(|id| self.texture(id))
    }

    pub fn palette(&self) -> &[u32] {
        &self.palette
    }

    pub fn palette_len(&self) -> usize {
        self.palette.len()
    }

    #[inline]
    pub fn color(&self, index: PaletteIndex, level: LightLevel) -> u32 {
        self.color_ramp[((index as usize) << LIGHT_LEVEL_BITS) + level.index()]
    }

    #[inline]
    pub fn color_full_bright(&self, index: PaletteIndex) -> u32 {
        self.color(index, FULL_BRIGHT)
    }
}

fn build_color_ramp(palette: &[u32]) -> Vec<u32> {
    let mut ramp = vec![0; palette.len() << LIGHT_LEVEL_BITS];
    for (chunk, &color) in ramp.chunks_exact_mut(LIGHT_LEVELS).zip(palette) {
        let hsv = Hsv::from_argb(color);
        for (level, slot) in chunk.iter_mut().enumerate() {
            let level = LightLevel::new(level as u32).unwrap_or(FULL_BRIGHT);
            *slot = if level == FULL_BRIGHT {
                // keep the source colour bit exact
                color | OPAQUE
            } else {
                hsv.adjust(0.0, level.saturation_factor(), level.value_factor())
                    .to_argb()
            };
        }
    }
    ramp
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{luma, pack_rgb};

    fn checker(name: &str, a: u32, b: u32) -> RawTexture {
        RawTexture::generate(name, 4, 4, |x, y| if (x + y) % 2 == 0 { a } else { b }).unwrap()
    }

    fn library() -> ImageLibrary {
        ImageLibrary::new(
            vec![
                checker("red", pack_rgb(200, 30, 30), pack_rgb(90, 10, 10)),
                checker("grey", pack_rgb(128, 128, 128), pack_rgb(200, 30, 30)),
            ],
            &[TextureVariant::darkened("grey", 0.5)],
        )
        .unwrap()
    }

    #[test]
    fn deduplicates_colours_across_textures() {
        let lib = library();
        // red texture: 2 colours, grey adds one new, the darkened grey adds two
        assert_eq!(lib.palette_len(), 5);
        let red = lib.texture_by_name("red").unwrap();
        let grey = lib.texture_by_name("grey").unwrap();
        assert_eq!(red.get(0, 0), grey.get(1, 0));
    }

    #[test]
    fn full_bright_returns_source_colour() {
        let lib = library();
        for (i, &c) in lib.palette().iter().enumerate() {
            assert_eq!(lib.color_full_bright(i as PaletteIndex), c);
        }
    }

    #[test]
    fn brightness_rises_up_to_full_bright() {
        let lib = library();
        for index in 0..lib.palette_len() as PaletteIndex {
            let mut previous = -1.0;
            for level in 0..=FULL_BRIGHT.index() as u32 {
                let level = LightLevel::new(level).unwrap();
                let brightness = luma(lib.color(index, level));
                assert!(
                    brightness >= previous,
                    "palette {index} dimmed at level {level:?}"
                );
                previous = brightness;
            }
        }
    }

    #[test]
    fn overbright_raises_value() {
        let lib = library();
        for index in 0..lib.palette_len() as PaletteIndex {
            let full = Hsv::from_argb(lib.color_full_bright(index));
            let over = Hsv::from_argb(lib.color(index, LightLevel::BRIGHTEST));
            assert!(over.v >= full.v);
            assert!(over.s >= full.s - 1e-2);
        }
    }

    #[test]
    fn unknown_texture_is_a_load_error() {
        let lib = library();
        assert!(matches!(
            lib.texture_id("missing"),
            Err(EngineError::MissingTexture { .. })
        ));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let result = ImageLibrary::new(
            vec![
                checker("a", pack_rgb(1, 2, 3), pack_rgb(4, 5, 6)),
                checker("a", pack_rgb(7, 8, 9), pack_rgb(4, 5, 6)),
            ],
            &[],
        );
        assert!(matches!(result, Err(EngineError::DuplicateTexture { .. })));
    }

    #[test]
    fn malformed_textures_fail_at_load() {
        let empty = RawTexture {
            name: "empty".into(),
            width: 0,
            height: 0,
            pixels: Vec::new(),
        };
        let result = ImageLibrary::new(vec![checker("ok", 1, 2), empty], &[]);
        assert!(matches!(
            result,
            Err(EngineError::TextureSize { expected: 0, actual: 0, .. })
        ));

        let short = RawTexture {
            name: "short".into(),
            width: 4,
            height: 4,
            pixels: vec![pack_rgb(9, 9, 9); 3],
        };
        let result = ImageLibrary::new(vec![short], &[]);
        assert!(matches!(
            result,
            Err(EngineError::TextureSize { expected: 16, actual: 3, .. })
        ));
    }
}
