use std::env;
use std::str::FromStr;

use log::warn;

use crate::color::pack_rgb;

/// Engine tunables. `Default` gives the stock setup; [`EngineConfig::from_env`]
/// lets a few of them be overridden without a rebuild.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Internal render resolution; the host scales it to the window.
    pub render_width: usize,
    pub render_height: usize,
    /// Vertical field of view in degrees. The default makes a wall one unit
    /// high at distance `d` exactly `height / d` pixels tall.
    pub fov_y_deg: f64,
    pub move_speed: f64, // units per second
    pub turn_speed: f64, // radians per second
    pub player_radius: f64,
    /// World units of distance per light level lost; `None` disables falloff.
    pub distance_falloff: Option<f64>,
    pub background: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            render_width: 640,
            render_height: 480,
            fov_y_deg: 2.0 * 0.5f64.atan().to_degrees(),
            move_speed: 5.0,
            turn_speed: 3.0,
            player_radius: 0.25,
            distance_falloff: Some(6.0),
            background: pack_rgb(0, 0, 0),
        }
    }
}

impl EngineConfig {
    pub fn aspect(&self) -> f64 {
        self.render_width as f64 / self.render_height as f64
    }

    /// Defaults overlaid with `RAYCASTER_WIDTH`, `RAYCASTER_HEIGHT` and
    /// `RAYCASTER_VFOV`. Unparsable values are ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        override_from_env("RAYCASTER_WIDTH", &mut config.render_width, |w| *w >= 16);
        override_from_env("RAYCASTER_HEIGHT", &mut config.render_height, |h| *h >= 16);
        override_from_env("RAYCASTER_VFOV", &mut config.fov_y_deg, |f| {
            *f > 1.0 && *f < 179.0
        });
        config
    }
}

fn override_from_env<T: FromStr>(key: &str, slot: &mut T, valid: impl Fn(&T) -> bool) {
    let Ok(raw) = env::var(key) else {
        return;
    };
    match raw.trim().parse::<T>() {
        Ok(value) if valid(&value) => *slot = value,
        _ => warn!("ignoring {key}={raw:?}: not a usable value"),
    }
}
