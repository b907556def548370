//! Built-in content: procedural textures and a sample level, standing in for
//! the asset pipeline so the engine can run and be tested on its own.

use std::collections::HashMap;
use std::f64::consts::PI;

use glam::DVec2;

use crate::color::{Hsv, pack_rgb};
use crate::error::Result;
use crate::image_library::ImageLibrary;
use crate::light::FULL_BRIGHT;
use crate::map::{LIGHT_SUBDIVISIONS, MapDescription, SectorTemplate, Spawn};
use crate::texture::{RawTexture, TextureVariant};

pub const TEXTURE_SIZE: usize = 64;

const LEVEL: [&str; 24] = [
    "########################",
    "#......................#",
    "#......................#",
    "#......................#",
    "#.....TTTTT....S,S,S...#",
    "#.....T...T....,,,,,...#",
    "#.....T...T....S,,,S...#",
    "#.....T...T....,,,,,...#",
    "#.....TT.TT....S,S,S...#",
    "#......................#",
    "#......................#",
    "#......................#",
    "#......................#",
    "#......................#",
    "#......................#",
    "#......................#",
    "#PPPPPPPP.......,,,,...#",
    "#P.P....P.......,,,,...#",
    "#P....M.P.......,,,,...#",
    "#P.P....P.......,,,,...#",
    "#P.PPPPPP..............#",
    "#P.....................#",
    "#PPPPPPPP..............#",
    "########################",
];

fn shade(color: u32, value_scale: f32) -> u32 {
    Hsv::from_argb(color).adjust(0.0, 1.0, value_scale).to_argb()
}

fn brick(x: usize, y: usize) -> u32 {
    let row = y / 16;
    let offset = if row % 2 == 0 { 0 } else { 16 };
    let mortar = y % 16 == 0 || (x + offset) % 32 == 0;
    if mortar {
        pack_rgb(170, 165, 150)
    } else {
        shade(pack_rgb(150, 62, 40), 0.85 + 0.15 * ((x * 7 + y * 13) % 5) as f32 / 4.0)
    }
}

fn tile(x: usize, y: usize) -> u32 {
    if x % 16 == 0 || y % 16 == 0 {
        pack_rgb(40, 40, 48)
    } else if ((x / 16) + (y / 16)) % 2 == 0 {
        pack_rgb(90, 110, 160)
    } else {
        pack_rgb(200, 200, 210)
    }
}

fn stone(x: usize, y: usize) -> u32 {
    let n = (x * 31 + y * 17 + (x * y) % 7) % 9;
    shade(pack_rgb(120, 120, 112), 0.7 + 0.3 * n as f32 / 8.0)
}

fn panel(x: usize, y: usize) -> u32 {
    let edge = x < 2 || y < 2 || x >= TEXTURE_SIZE - 2 || y >= TEXTURE_SIZE - 2;
    let rivet = (x == 6 || x == TEXTURE_SIZE - 7) && (y == 6 || y == TEXTURE_SIZE - 7);
    if edge || rivet {
        pack_rgb(50, 70, 50)
    } else {
        let hue = 360.0 * (x + y) as f32 / (2 * TEXTURE_SIZE) as f32;
        Hsv {
            h: hue,
            s: 0.35,
            v: 0.55,
        }
        .to_argb()
    }
}

fn metal(x: usize, y: usize) -> u32 {
    let stripe = (x / 8) % 2 == 1;
    let base = if stripe { 0.8 } else { 1.0 };
    shade(pack_rgb(150, 155, 165), base - (y % 8) as f32 * 0.01)
}

fn floor(x: usize, y: usize) -> u32 {
    let checker = ((x / 8) + (y / 8)) % 2 == 0;
    if checker {
        pack_rgb(96, 84, 70)
    } else {
        pack_rgb(70, 60, 52)
    }
}

fn ceiling(x: usize, y: usize) -> u32 {
    if x % 32 == 0 || y % 32 == 0 {
        pack_rgb(60, 60, 60)
    } else {
        pack_rgb(110, 108, 100)
    }
}

pub fn demo_textures() -> Result<Vec<RawTexture>> {
    let n = TEXTURE_SIZE;
    let generators: [(&str, fn(usize, usize) -> u32); 7] = [
        ("brick", brick),
        ("tile", tile),
        ("stone", stone),
        ("panel", panel),
        ("metal", metal),
        ("floor", floor),
        ("ceiling", ceiling),
    ];
    generators
        .into_iter()
        .map(|(name, f)| RawTexture::generate(name, n, n, f))
        .collect()
}

pub fn demo_variants() -> Vec<TextureVariant> {
    vec![
        TextureVariant::darkened("brick", 0.75),
        TextureVariant {
            name: "floor_tinted".into(),
            source: "floor".into(),
            hue_shift: -180.0,
            saturation_scale: 1.5,
            value_scale: 0.5,
        },
        TextureVariant {
            name: "ceiling_tinted".into(),
            source: "ceiling".into(),
            hue_shift: -180.0,
            saturation_scale: 1.5,
            value_scale: 0.5,
        },
    ]
}

pub fn demo_library() -> Result<ImageLibrary> {
    ImageLibrary::new(demo_textures()?, &demo_variants())
}

fn legend() -> HashMap<char, SectorTemplate> {
    let mut legend = HashMap::new();
    legend.insert(
        '#',
        SectorTemplate::Wall {
            north: Some("brick".into()),
            south: Some("brick".into()),
            east: Some("brick_dark".into()),
            west: Some("brick_dark".into()),
        },
    );
    legend.insert('T', SectorTemplate::wall("tile"));
    legend.insert('S', SectorTemplate::wall("stone"));
    legend.insert('P', SectorTemplate::wall("panel"));
    legend.insert('M', SectorTemplate::wall("metal"));
    legend.insert('.', SectorTemplate::open("floor", "ceiling", FULL_BRIGHT.index() as u32));
    legend.insert(',', SectorTemplate::open("floor_tinted", "ceiling_tinted", 7));
    legend
}

/// Light grid for the demo level: evenly lit, dim inside the tinted
/// courtyard, and a glow spilling out of the tiled room's doorway.
fn demo_light_rows() -> Vec<String> {
    let glow = DVec2::new(8.5, 8.5) * LIGHT_SUBDIVISIONS as f64;
    let cols = LEVEL[0].len() * LIGHT_SUBDIVISIONS;
    let rows = LEVEL.len() * LIGHT_SUBDIVISIONS;

    (0..rows)
        .map(|ly| {
            (0..cols)
                .map(|lx| {
                    let code = LEVEL[ly / LIGHT_SUBDIVISIONS].as_bytes()[lx / LIGHT_SUBDIVISIONS];
                    let base: u32 = if code == b',' { 5 } else { 10 };
                    let d = DVec2::new(lx as f64 + 0.5, ly as f64 + 0.5).distance(glow);
                    let boost = (15.0 - d).max(0.0) as u32;
                    let level = base.max(boost).min(15);
                    char::from_digit(level, 16).unwrap_or('c')
                })
                .collect()
        })
        .collect()
}

pub fn demo_map() -> MapDescription {
    MapDescription {
        width: LEVEL[0].len(),
        height: LEVEL.len(),
        rows: LEVEL.iter().map(|r| r.to_string()).collect(),
        legend: legend(),
        light_rows: Some(demo_light_rows()),
        spawn: Spawn {
            position: DVec2::new(12.5, 12.5),
            facing_radians: PI,
        },
    }
}

/// Walled border around an empty floor, spawn in the middle facing east.
pub fn open_arena(width: usize, height: usize) -> MapDescription {
    let rows = (0..height)
        .map(|y| {
            (0..width)
                .map(|x| {
                    if x == 0 || y == 0 || x + 1 == width || y + 1 == height {
                        '#'
                    } else {
                        '.'
                    }
                })
                .collect()
        })
        .collect();
    MapDescription {
        width,
        height,
        rows,
        legend: legend(),
        light_rows: None,
        spawn: Spawn {
            position: DVec2::new(width as f64 / 2.0, height as f64 / 2.0),
            facing_radians: 0.0,
        },
    }
}
