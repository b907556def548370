//! Grid world: sectors, their wall/floor/ceiling textures and a light grid
//! at twice the sector resolution.

use std::collections::HashMap;
use std::sync::Arc;

use glam::DVec2;
use log::info;

use crate::error::{EngineError, Result};
use crate::image_library::{ImageLibrary, TextureId};
use crate::light::{FULL_BRIGHT, LightLevel};
use crate::texture::{IndexedColorTexture, PaletteIndex};

/// Light cells per sector along each axis.
pub const LIGHT_SUBDIVISIONS: usize = 2;

/// Face of a sector. North is towards -y, west towards -x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectorSide {
    North,
    South,
    East,
    West,
}

impl SectorSide {
    /// Unit vector pointing out of the sector through this face.
    pub fn outward(self) -> DVec2 {
        match self {
            SectorSide::North => DVec2::new(0.0, -1.0),
            SectorSide::South => DVec2::new(0.0, 1.0),
            SectorSide::East => DVec2::new(1.0, 0.0),
            SectorSide::West => DVec2::new(-1.0, 0.0),
        }
    }
}

/// Per-side wall textures. `None` means nothing is drawn on that face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallTextures {
    pub north: Option<TextureId>,
    pub south: Option<TextureId>,
    pub east: Option<TextureId>,
    pub west: Option<TextureId>,
}

impl WallTextures {
    pub fn side(&self, side: SectorSide) -> Option<TextureId> {
        match side {
            SectorSide::North => self.north,
            SectorSide::South => self.south,
            SectorSide::East => self.east,
            SectorSide::West => self.west,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sector {
    /// Opaque tile: blocks rays and movement from every direction.
    Solid(WallTextures),
    Open {
        floor: TextureId,
        ceiling: TextureId,
        passable: bool,
    },
}

impl Sector {
    #[inline]
    pub fn has_walls(&self) -> bool {
        matches!(self, Sector::Solid(_))
    }

    #[inline]
    pub fn is_passable(&self) -> bool {
        matches!(self, Sector::Open { passable: true, .. })
    }
}

/// Texture names for one legend entry of a [`MapDescription`].
#[derive(Debug, Clone, PartialEq)]
pub enum SectorTemplate {
    Wall {
        north: Option<String>,
        south: Option<String>,
        east: Option<String>,
        west: Option<String>,
    },
    Open {
        floor: String,
        ceiling: String,
        light: u32,
        passable: bool,
    },
}

impl SectorTemplate {
    /// A wall with the same texture on all four faces.
    pub fn wall(texture: &str) -> Self {
        SectorTemplate::Wall {
            north: Some(texture.to_owned()),
            south: Some(texture.to_owned()),
            east: Some(texture.to_owned()),
            west: Some(texture.to_owned()),
        }
    }

    /// A walkable floor tile.
    pub fn open(floor: &str, ceiling: &str, light: u32) -> Self {
        SectorTemplate::Open {
            floor: floor.to_owned(),
            ceiling: ceiling.to_owned(),
            light,
            passable: true,
        }
    }

    fn resolve(&self, library: &ImageLibrary) -> Result<(Sector, LightLevel)> {
        let lookup = |name: &Option<String>| -> Result<Option<TextureId>> {
            name.as_deref().map(|n| library.texture_id(n)).transpose()
        };
        match self {
            SectorTemplate::Wall {
                north,
                south,
                east,
                west,
            } => Ok((
                Sector::Solid(WallTextures {
                    north: lookup(north)?,
                    south: lookup(south)?,
                    east: lookup(east)?,
                    west: lookup(west)?,
                }),
                FULL_BRIGHT,
            )),
            SectorTemplate::Open {
                floor,
                ceiling,
                light,
                passable,
            } => {
                let level =
                    LightLevel::new(*light).ok_or(EngineError::LightLevel { level: *light })?;
                Ok((
                    Sector::Open {
                        floor: library.texture_id(floor)?,
                        ceiling: library.texture_id(ceiling)?,
                        passable: *passable,
                    },
                    level,
                ))
            }
        }
    }
}

/// Where the camera starts, in world units, and the angle it faces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spawn {
    pub position: DVec2,
    pub facing_radians: f64,
}

/// Static textual description of a level.
#[derive(Debug, Clone)]
pub struct MapDescription {
    pub width: usize,
    pub height: usize,
    /// One string per map row (y), one tile code per column (x).
    pub rows: Vec<String>,
    pub legend: HashMap<char, SectorTemplate>,
    /// Optional hex-digit light grid, `2·width` columns by `2·height` rows.
    pub light_rows: Option<Vec<String>>,
    pub spawn: Spawn,
}

pub struct MapData {
    width: usize,
    height: usize,
    sectors: Vec<Sector>,
    light: Vec<LightLevel>,
    library: Arc<ImageLibrary>,
    spawn: Spawn,
}

impl MapData {
    pub fn load(desc: &MapDescription, library: Arc<ImageLibrary>) -> Result<Self> {
        check_len("row count", desc.height, desc.rows.len())?;

        let mut resolved = HashMap::with_capacity(desc.legend.len());
        for (&code, template) in &desc.legend {
            resolved.insert(code, template.resolve(&library)?);
        }

        let mut sectors = Vec::with_capacity(desc.width * desc.height);
        let mut sector_light = Vec::with_capacity(desc.width * desc.height);
        for (y, row) in desc.rows.iter().enumerate() {
            check_len(&format!("length of row {y}"), desc.width, row.chars().count())?;
            for (x, code) in row.chars().enumerate() {
                let &(sector, level) = resolved
                    .get(&code)
                    .ok_or(EngineError::UnknownTile { code, x, y })?;
                sectors.push(sector);
                sector_light.push(level);
            }
        }

        for y in 0..desc.height {
            for x in 0..desc.width {
                let border = x == 0 || y == 0 || x + 1 == desc.width || y + 1 == desc.height;
                if border && !sectors[y * desc.width + x].has_walls() {
                    return Err(EngineError::OpenBoundary { x, y });
                }
            }
        }

        let light = match &desc.light_rows {
            Some(rows) => parse_light_rows(rows, desc.width, desc.height)?,
            None => expand_sector_light(&sector_light, desc.width, desc.height),
        };

        let map = Self {
            width: desc.width,
            height: desc.height,
            sectors,
            light,
            library,
            spawn: desc.spawn,
        };

        let spawn = map.spawn.position;
        if !map.is_passable(spawn.x.floor() as i32, spawn.y.floor() as i32) {
            return Err(EngineError::SpawnBlocked {
                x: spawn.x,
                y: spawn.y,
            });
        }

        info!(
            "map loaded: {}x{} sectors, {} light grid",
            map.width,
            map.height,
            if desc.light_rows.is_some() {
                "explicit"
            } else {
                "per-sector"
            }
        );
        Ok(map)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn spawn(&self) -> Spawn {
        self.spawn
    }

    pub fn library(&self) -> &ImageLibrary {
        &self.library
    }

    #[inline]
    pub fn sector(&self, x: i32, y: i32) -> Option<&Sector> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(&self.sectors[y as usize * self.width + x as usize])
    }

    /// Outside the grid counts as solid, so a ray always stops at the edge.
    #[inline]
    pub fn has_walls(&self, x: i32, y: i32) -> bool {
        self.sector(x, y).is_none_or(Sector::has_walls)
    }

    /// Collision probes may land just outside the grid; those are blocked.
    #[inline]
    pub fn is_passable(&self, x: i32, y: i32) -> bool {
        self.sector(x, y).is_some_and(Sector::is_passable)
    }

    pub fn wall_texture(&self, x: i32, y: i32, side: SectorSide) -> Option<&IndexedColorTexture> {
        match self.sector(x, y)? {
            Sector::Solid(walls) => walls.side(side).map(|id| self.library.texture(id)),
            Sector::Open { .. } => None,
        }
    }

    pub fn floor_texture(&self, x: i32, y: i32) -> Option<&IndexedColorTexture> {
        match self.sector(x, y)? {
            Sector::Open { floor, .. } => Some(self.library.texture(*floor)),
            Sector::Solid(_) => None,
        }
    }

    pub fn ceiling_texture(&self, x: i32, y: i32) -> Option<&IndexedColorTexture> {
        match self.sector(x, y)? {
            Sector::Open { ceiling, .. } => Some(self.library.texture(*ceiling)),
            Sector::Solid(_) => None,
        }
    }

    #[inline]
    pub fn shade(&self, index: PaletteIndex, level: LightLevel) -> u32 {
        self.library.color(index, level)
    }

    /// Light cell containing a world position, clamped to the grid.
    #[inline]
    pub fn light_level_at(&self, pos: DVec2) -> LightLevel {
        let cols = self.width * LIGHT_SUBDIVISIONS;
        let rows = self.height * LIGHT_SUBDIVISIONS;
        let scale = LIGHT_SUBDIVISIONS as f64;
        let lx = ((pos.x * scale).floor().max(0.0) as usize).min(cols - 1);
        let ly = ((pos.y * scale).floor().max(0.0) as usize).min(rows - 1);
        self.light[ly * cols + lx]
    }

    /// Light for a wall face, read from the cell in front of the face rather
    /// than from the wall's own sector.
    #[inline]
    pub fn wall_light_level(&self, hit: DVec2, side: SectorSide) -> LightLevel {
        let half_cell = 0.5 / LIGHT_SUBDIVISIONS as f64;
        self.light_level_at(hit + side.outward() * half_cell)
    }
}

fn check_len(what: &str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(EngineError::MapDimensions {
            what: what.to_owned(),
            expected,
            actual,
        })
    }
}

fn parse_light_rows(rows: &[String], width: usize, height: usize) -> Result<Vec<LightLevel>> {
    let cols = width * LIGHT_SUBDIVISIONS;
    check_len("light row count", height * LIGHT_SUBDIVISIONS, rows.len())?;

    let mut light = Vec::with_capacity(cols * rows.len());
    for (y, row) in rows.iter().enumerate() {
        check_len(&format!("length of light row {y}"), cols, row.chars().count())?;
        for (x, code) in row.chars().enumerate() {
            light.push(LightLevel::from_hex_digit(code).ok_or(EngineError::LightCode { code, x, y })?);
        }
    }
    Ok(light)
}

fn expand_sector_light(sector_light: &[LightLevel], width: usize, height: usize) -> Vec<LightLevel> {
    let cols = width * LIGHT_SUBDIVISIONS;
    let mut light = Vec::with_capacity(cols * height * LIGHT_SUBDIVISIONS);
    for ly in 0..height * LIGHT_SUBDIVISIONS {
        for lx in 0..cols {
            let sx = lx / LIGHT_SUBDIVISIONS;
            let sy = ly / LIGHT_SUBDIVISIONS;
            light.push(sector_light[sy * width + sx]);
        }
    }
    light
}
