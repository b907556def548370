use glam::DVec2;

use crate::camera::Camera;
use crate::config::EngineConfig;
use crate::input::MovementInputs;
use crate::map::MapData;

/// The camera plus what it takes to walk it around a map.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub camera: Camera,
    radius: f64,
    move_speed: f64,
    turn_speed: f64,
}

impl Player {
    pub fn new(camera: Camera, config: &EngineConfig) -> Self {
        Self {
            camera,
            radius: config.player_radius,
            move_speed: config.move_speed,
            turn_speed: config.turn_speed,
        }
    }

    /// Places a player at the map's spawn point.
    pub fn spawn(map: &MapData, config: &EngineConfig) -> Self {
        let spawn = map.spawn();
        let camera = Camera::new(
            spawn.position,
            spawn.facing_radians,
            config.fov_y_deg,
            config.aspect(),
        );
        Self::new(camera, config)
    }

    /// Applies one frame of input. Opposing pairs never cancel out: forward
    /// beats backward, strafe left beats strafe right, and turn right beats
    /// turn left.
    pub fn update(&mut self, map: &MapData, inputs: MovementInputs, dt_s: f64) {
        let move_step = self.move_speed * dt_s;
        let turn_step = self.turn_speed * dt_s;
        let forward = self.camera.direction;
        let right = self.camera.right();

        if inputs.contains(MovementInputs::FORWARD) {
            self.move_by(map, forward, move_step);
        } else if inputs.contains(MovementInputs::BACKWARD) {
            self.move_by(map, -forward, move_step);
        }

        if inputs.contains(MovementInputs::STRAFE_LEFT) {
            self.move_by(map, -right, move_step);
        } else if inputs.contains(MovementInputs::STRAFE_RIGHT) {
            self.move_by(map, right, move_step);
        }

        if inputs.contains(MovementInputs::TURN_RIGHT) {
            self.camera.rotate(turn_step);
        } else if inputs.contains(MovementInputs::TURN_LEFT) {
            self.camera.rotate(-turn_step);
        }
    }

    /// Moves along `direction` with collision. Each axis is resolved on its
    /// own against a probe pushed `radius` ahead of the new position, so a
    /// diagonal push into a wall slides along it.
    pub fn move_by(&mut self, map: &MapData, direction: DVec2, speed: f64) {
        let old = self.camera.position;
        let target = old + direction * speed;
        let probe = target + direction * self.radius;

        if map.is_passable(probe.x.floor() as i32, old.y.floor() as i32) {
            self.camera.position.x = target.x;
        }
        let x = self.camera.position.x;
        if map.is_passable(x.floor() as i32, probe.y.floor() as i32) {
            self.camera.position.y = target.y;
        }
    }
}
