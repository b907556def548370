//! Column ray caster.
//!
//! Every screen column casts one ray through the sector grid with a DDA walk,
//! draws the textured wall strip it hits and floor-casts the rows below it,
//! mirroring them onto the ceiling. Columns share nothing but read-only state,
//! so a frame is a single rayon fan-out over the buffer's columns.

use glam::DVec2;
use rayon::iter::{IndexedParallelIterator, ParallelIterator};

use crate::camera::Camera;
use crate::config::EngineConfig;
use crate::light::LightLevel;
use crate::map::{MapData, SectorSide};
use crate::screen_buffer::ScreenBuffer;
use crate::texture::IndexedColorTexture;

/// Anything a ray can be walked through.
pub trait WallGrid {
    /// Must answer `true` outside the grid so every walk terminates.
    fn has_walls(&self, x: i32, y: i32) -> bool;
}

impl WallGrid for MapData {
    #[inline]
    fn has_walls(&self, x: i32, y: i32) -> bool {
        MapData::has_walls(self, x, y)
    }
}

/// Where a ray first entered a walled sector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub map_x: i32,
    pub map_y: i32,
    /// Face of the walled sector that was crossed.
    pub side: SectorSide,
    /// Distance along the camera direction, not along the ray.
    pub perp_dist: f64,
    /// Point on the face where the ray struck it.
    pub point: DVec2,
    /// Position along the face in `[0, 1)`.
    pub wall_x: f64,
}

/// Vertical extent of a wall on screen. Rows `draw_start..draw_end` belong
/// to the wall; the strip is centred so `draw_start + draw_end == height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallStrip {
    pub line_height: i64,
    pub draw_start: usize,
    pub draw_end: usize,
}

// per-axis step direction, distance between grid lines, distance to the first one
#[inline]
fn axis_setup(origin: f64, cell: i32, dir: f64) -> (i32, f64, f64) {
    if dir == 0.0 {
        // never crosses a grid line on this axis; 0 * inf would be NaN
        return (1, f64::INFINITY, f64::INFINITY);
    }
    let delta = (1.0 / dir).abs();
    if dir < 0.0 {
        (-1, delta, (origin - cell as f64) * delta)
    } else {
        (1, delta, (cell as f64 + 1.0 - origin) * delta)
    }
}

/// Walks a ray from `origin` along `dir` until it enters a walled sector.
pub fn cast_ray<G: WallGrid + ?Sized>(grid: &G, origin: DVec2, dir: DVec2) -> RayHit {
    let mut map_x = origin.x.floor() as i32;
    let mut map_y = origin.y.floor() as i32;

    let (step_x, delta_x, mut side_dist_x) = axis_setup(origin.x, map_x, dir.x);
    let (step_y, delta_y, mut side_dist_y) = axis_setup(origin.y, map_y, dir.y);

    let mut crossed_x;
    loop {
        if side_dist_x < side_dist_y {
            side_dist_x += delta_x;
            map_x += step_x;
            crossed_x = true;
        } else {
            side_dist_y += delta_y;
            map_y += step_y;
            crossed_x = false;
        }
        if grid.has_walls(map_x, map_y) {
            break;
        }
    }

    if crossed_x {
        // the near face of the sector: its west edge when stepping east
        let boundary = map_x as f64 + if step_x < 0 { 1.0 } else { 0.0 };
        let perp_dist = (boundary - origin.x) / dir.x;
        let y = origin.y + perp_dist * dir.y;
        RayHit {
            map_x,
            map_y,
            side: if step_x > 0 {
                SectorSide::West
            } else {
                SectorSide::East
            },
            perp_dist,
            point: DVec2::new(boundary, y),
            wall_x: y - y.floor(),
        }
    } else {
        let boundary = map_y as f64 + if step_y < 0 { 1.0 } else { 0.0 };
        let perp_dist = (boundary - origin.y) / dir.y;
        let x = origin.x + perp_dist * dir.x;
        RayHit {
            map_x,
            map_y,
            side: if step_y > 0 {
                SectorSide::North
            } else {
                SectorSide::South
            },
            perp_dist,
            point: DVec2::new(x, boundary),
            wall_x: x - x.floor(),
        }
    }
}

/// Projects a wall at `perp_dist` onto a viewport `height` rows tall.
pub fn wall_strip(perp_dist: f64, height: usize, projection_scale: f64) -> WallStrip {
    let projected = (height as f64 * projection_scale / perp_dist).abs();
    // saturating cast, then keep the fixed-point texture maths in range
    let line_height = (projected as i64).min(i32::MAX as i64);
    let h = height as i64;
    let draw_start = (h / 2 - line_height / 2).max(0);
    WallStrip {
        line_height,
        draw_start: draw_start as usize,
        draw_end: (h - draw_start) as usize,
    }
}

#[inline]
fn camera_x(column: usize, width: usize) -> f64 {
    2.0 * column as f64 / width as f64 - 1.0
}

pub struct Renderer {
    distance_falloff: Option<f64>,
    background: u32,
}

impl Renderer {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            distance_falloff: config.distance_falloff,
            background: config.background,
        }
    }

    /// Renders a full frame. The camera is copied up front, so every column
    /// sees the same viewpoint.
    pub fn render_frame(&self, buf: &mut ScreenBuffer, map: &MapData, camera: &Camera) {
        let view = *camera;
        let width = buf.width();
        buf.par_columns_mut()
            .enumerate()
            .for_each(|(x, column)| self.render_column(column, x, width, map, &view));
    }

    /// Wall extent of one column, without drawing anything.
    pub fn column_strip(
        &self,
        map: &MapData,
        camera: &Camera,
        column: usize,
        width: usize,
        height: usize,
    ) -> WallStrip {
        let ray = camera.ray_direction(camera_x(column, width));
        let hit = cast_ray(map, camera.position, ray);
        wall_strip(hit.perp_dist, height, camera.projection_scale())
    }

    #[inline]
    fn attenuate(&self, level: LightLevel, distance: f64) -> LightLevel {
        match self.distance_falloff {
            Some(per_level) if per_level > 0.0 => level.darken((distance / per_level) as u32),
            _ => level,
        }
    }

    fn render_column(
        &self,
        column: &mut [u32],
        x: usize,
        width: usize,
        map: &MapData,
        camera: &Camera,
    ) {
        let height = column.len();
        let ray = camera.ray_direction(camera_x(x, width));
        let hit = cast_ray(map, camera.position, ray);
        let strip = wall_strip(hit.perp_dist, height, camera.projection_scale());

        self.draw_wall(column, map, &hit, &strip);
        self.draw_floor_and_ceiling(column, map, camera, &hit, &strip);
    }

    fn draw_wall(&self, column: &mut [u32], map: &MapData, hit: &RayHit, strip: &WallStrip) {
        let h = column.len() as i64;
        let wall = &mut column[strip.draw_start..strip.draw_end];
        let Some(texture) = map.wall_texture(hit.map_x, hit.map_y, hit.side) else {
            wall.fill(self.background);
            return;
        };

        let tex_w = texture.width();
        let tex_h = texture.height() as i64;
        let mut tex_x = ((hit.wall_x * tex_w as f64) as usize).min(tex_w - 1);
        // keep textures reading left to right from the viewer's side
        if matches!(hit.side, SectorSide::East | SectorSide::North) {
            tex_x = tex_w - 1 - tex_x;
        }
        let texels = texture.column(tex_x);

        let level = self.attenuate(map.wall_light_level(hit.point, hit.side), hit.perp_dist);
        let line_height = strip.line_height.max(1);

        for (row, px) in (strip.draw_start..).zip(wall.iter_mut()) {
            // 8.8 fixed point: (row - h/2 + line_height/2) * tex_h / line_height
            let d = row as i64 * 256 - h * 128 + line_height * 128;
            let tex_y = (d * tex_h / line_height / 256).clamp(0, tex_h - 1);
            *px = map.shade(texels[tex_y as usize], level);
        }
    }

    fn draw_floor_and_ceiling(
        &self,
        column: &mut [u32],
        map: &MapData,
        camera: &Camera,
        hit: &RayHit,
        strip: &WallStrip,
    ) {
        let height = column.len();
        let h = height as f64;
        let scale = camera.projection_scale();

        for y in strip.draw_end..height {
            // distance to the floor seen through the centre of row y
            let row_dist = h * scale / (2.0 * y as f64 + 1.0 - h);
            let weight = row_dist / hit.perp_dist;
            let floor_pos = hit.point * weight + camera.position * (1.0 - weight);

            let sx = floor_pos.x.floor() as i32;
            let sy = floor_pos.y.floor() as i32;
            let level = self.attenuate(map.light_level_at(floor_pos), row_dist);

            let sample = |texture: Option<&IndexedColorTexture>| match texture {
                Some(tex) => {
                    let tx = (floor_pos.x * tex.width() as f64).floor() as i64;
                    let ty = (floor_pos.y * tex.height() as f64).floor() as i64;
                    map.shade(tex.get_wrapped(tx, ty), level)
                }
                None => self.background,
            };

            column[y] = sample(map.floor_texture(sx, sy));
            column[height - 1 - y] = sample(map.ceiling_texture(sx, sy));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::f64::consts::PI;
    use std::sync::Arc;

    use crate::color::pack_rgb;
    use crate::image_library::ImageLibrary;
    use crate::light::FULL_BRIGHT;
    use crate::map::{MapDescription, SectorTemplate, Spawn};
    use crate::texture::RawTexture;

    /// Open 3x3 grid with one wall in the middle; outside counts as solid.
    struct Pillar;

    impl WallGrid for Pillar {
        fn has_walls(&self, x: i32, y: i32) -> bool {
            !(0..3).contains(&x) || !(0..3).contains(&y) || (x == 1 && y == 1)
        }
    }

    const EPS: f64 = 1e-12;

    #[test]
    fn axis_aligned_ray_hits_at_euclidean_distance() {
        let hit = cast_ray(&Pillar, DVec2::new(1.5, 0.25), DVec2::new(0.0, 1.0));
        assert_eq!((hit.map_x, hit.map_y), (1, 1));
        assert_eq!(hit.side, SectorSide::North);
        assert!((hit.perp_dist - 0.75).abs() < EPS);
        assert!((hit.wall_x - 0.5).abs() < EPS);

        let hit = cast_ray(&Pillar, DVec2::new(0.2, 1.5), DVec2::new(1.0, 0.0));
        assert_eq!(hit.side, SectorSide::West);
        assert!((hit.perp_dist - 0.8).abs() < EPS);

        let hit = cast_ray(&Pillar, DVec2::new(2.9, 1.5), DVec2::new(-1.0, 0.0));
        assert_eq!(hit.side, SectorSide::East);
        assert!((hit.perp_dist - 0.9).abs() < EPS);

        let hit = cast_ray(&Pillar, DVec2::new(1.5, 2.6), DVec2::new(0.0, -1.0));
        assert_eq!(hit.side, SectorSide::South);
        assert!((hit.perp_dist - 0.6).abs() < EPS);
    }

    #[test]
    fn perpendicular_distance_has_no_fisheye() {
        // two rays from the same camera to the same flat face differ in
        // length but share a perpendicular distance
        let origin = DVec2::new(1.5, 0.25);
        let forward = DVec2::new(0.0, 1.0);
        let plane = DVec2::new(0.4, 0.0);
        let a = cast_ray(&Pillar, origin, forward);
        let b = cast_ray(&Pillar, origin, forward + plane * 0.5);
        assert_eq!((b.map_x, b.map_y), (1, 1));
        assert!((a.perp_dist - b.perp_dist).abs() < EPS);
    }

    #[test]
    fn walk_stops_at_grid_edge() {
        let hit = cast_ray(&Pillar, DVec2::new(0.5, 0.5), DVec2::new(-1.0, 0.0));
        assert_eq!((hit.map_x, hit.map_y), (-1, 0));
        assert!((hit.perp_dist - 0.5).abs() < EPS);
    }

    #[test]
    fn zero_component_on_a_grid_line_stays_finite() {
        // x sits exactly on a grid line while the ray has no x component
        let hit = cast_ray(&Pillar, DVec2::new(2.0, 2.5), DVec2::new(0.0, -1.0));
        assert!(hit.perp_dist.is_finite());
        assert!(!hit.wall_x.is_nan());
        assert_eq!(hit.side, SectorSide::South);
    }

    #[test]
    fn strip_is_centred_and_clamped() {
        let strip = wall_strip(2.0, 480, 1.0);
        assert_eq!(strip.line_height, 240);
        assert_eq!((strip.draw_start, strip.draw_end), (120, 360));

        let close = wall_strip(0.01, 480, 1.0);
        assert_eq!((close.draw_start, close.draw_end), (0, 480));

        let odd = wall_strip(3.0, 101, 1.0);
        assert_eq!(odd.draw_start + odd.draw_end, 101);
        assert!(odd.draw_start < odd.draw_end);

        let touching = wall_strip(0.0, 480, 1.0);
        assert_eq!(touching.line_height, i32::MAX as i64);
    }

    const FRAME_H: usize = 24;

    /// 5x3 corridor, walls and floors all using one 4x4 texture whose texels
    /// are all distinct colours. Light is full bright except in front of the
    /// two end walls.
    fn corridor(spawn: DVec2, facing: f64) -> MapData {
        let grad = RawTexture::generate("grad", 4, 4, |x, y| {
            pack_rgb(40 + 50 * x as u8, 40 + 50 * y as u8, 90)
        })
        .unwrap();
        let library = Arc::new(ImageLibrary::new(vec![grad], &[]).unwrap());

        let mut legend = HashMap::new();
        legend.insert('#', SectorTemplate::wall("grad"));
        legend.insert('.', SectorTemplate::open("grad", "grad", 12));
        let mut light_rows = vec!["cccccccccc".to_string(); 6];
        // cell in front of the east wall's west face is 5, in front of the
        // west wall's east face is 9
        light_rows[3] = "cc9cccc5cc".to_string();

        let desc = MapDescription {
            width: 5,
            height: 3,
            rows: vec!["#####".into(), "#...#".into(), "#####".into()],
            legend,
            light_rows: Some(light_rows),
            spawn: Spawn {
                position: spawn,
                facing_radians: facing,
            },
        };
        MapData::load(&desc, library).unwrap()
    }

    /// Renders a 2-column frame; column 1 is the centre ray.
    fn render_centre(map: &MapData) -> (Vec<u32>, WallStrip) {
        let config = EngineConfig {
            distance_falloff: None,
            ..EngineConfig::default()
        };
        let spawn = map.spawn();
        let camera = Camera::new(
            spawn.position,
            spawn.facing_radians,
            config.fov_y_deg,
            2.0 / FRAME_H as f64,
        );
        let renderer = Renderer::new(&config);
        let mut frame = ScreenBuffer::new(2, FRAME_H, config.background);
        renderer.render_frame(&mut frame, map, &camera);
        let strip = renderer.column_strip(map, &camera, 1, 2, FRAME_H);
        (frame.column(1).to_vec(), strip)
    }

    fn texel(map: &MapData, x: usize, y: usize, level: LightLevel) -> u32 {
        let grad = map.library().texture_by_name("grad").unwrap();
        map.shade(grad.get(x, y), level)
    }

    #[test]
    fn wall_rows_follow_fixed_point_texture_mapping() {
        // 2.75 units from the west face of the east wall: 24 / 2.75 = 8.7 rows
        let map = corridor(DVec2::new(1.25, 1.6), 0.0);
        let (column, strip) = render_centre(&map);
        assert_eq!(strip.line_height, 8);
        assert_eq!((strip.draw_start, strip.draw_end), (8, 16));

        // wall_x = 0.6 gives texture column 2; West faces are not mirrored
        let lit = LightLevel::new(5).unwrap();
        assert_eq!(column[8], texel(&map, 2, 0, lit));
        assert_eq!(column[9], texel(&map, 2, 0, lit));
        assert_eq!(column[11], texel(&map, 2, 1, lit));
        assert_eq!(column[12], texel(&map, 2, 2, lit));
        assert_eq!(column[15], texel(&map, 2, 3, lit));
    }

    #[test]
    fn wall_is_lit_from_the_cell_in_front() {
        let map = corridor(DVec2::new(1.25, 1.6), 0.0);
        let (column, _) = render_centre(&map);
        assert_ne!(column[12], texel(&map, 2, 2, FULL_BRIGHT));
    }

    #[test]
    fn east_faces_mirror_the_texture_column() {
        // facing west at the same distance from the west wall's east face
        let map = corridor(DVec2::new(3.75, 1.6), PI);
        let (column, strip) = render_centre(&map);
        assert_eq!((strip.draw_start, strip.draw_end), (8, 16));

        let lit = LightLevel::new(9).unwrap();
        assert_eq!(column[8], texel(&map, 1, 0, lit));
        assert_eq!(column[15], texel(&map, 1, 3, lit));
    }

    #[test]
    fn ceiling_mirrors_the_floor() {
        let map = corridor(DVec2::new(1.25, 1.6), 0.0);
        let (column, strip) = render_centre(&map);
        for y in strip.draw_end..FRAME_H {
            assert_eq!(column[y], column[FRAME_H - 1 - y], "row {y}");
        }

        // bottom row sees the floor 24/23 units ahead: (2.29, 1.6) on the
        // texture grid lands on texel (9 mod 4, 6 mod 4)
        assert_eq!(column[FRAME_H - 1], texel(&map, 1, 2, FULL_BRIGHT));
        assert_eq!(column[0], texel(&map, 1, 2, FULL_BRIGHT));
    }
}
