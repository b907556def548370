use glam::DVec2;

/// Viewpoint in world space. World y grows southwards, so a positive
/// rotation turns the view clockwise (to the right).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: DVec2,   // world units, one sector per unit
    pub direction: DVec2,  // unit facing vector
    pub plane: DVec2,      // perpendicular to direction, length tan(fov_x / 2)
    projection_scale: f64, // screen heights per unit of wall height at distance 1
}

impl Camera {
    /// The horizontal FOV follows from the vertical one and the viewport
    /// aspect ratio, so the image is undistorted at any window shape.
    pub fn new(position: DVec2, facing_radians: f64, fov_y_deg: f64, aspect: f64) -> Self {
        let mut camera = Self {
            position,
            direction: DVec2::from_angle(facing_radians),
            plane: DVec2::ZERO,
            projection_scale: 1.0,
        };
        camera.set_fov_from_vertical(fov_y_deg, aspect);
        camera
    }

    /// fov_x = 2·atan(tan(fov_y / 2) · aspect); the plane spans
    /// `[-plane, +plane]`, a total width of 2·tan(fov_x / 2).
    pub fn set_fov_from_vertical(&mut self, fov_y_deg: f64, aspect: f64) {
        let half_fov_y_tan = (0.5 * fov_y_deg.to_radians()).tan();
        let fov_x = 2.0 * (half_fov_y_tan * aspect).atan();
        let plane_len = (0.5 * fov_x).tan();

        self.projection_scale = 0.5 / half_fov_y_tan;
        self.plane = self.direction.perp() * plane_len;
    }

    pub fn fov_x(&self) -> f64 {
        2.0 * (self.plane.length() / self.direction.length()).atan()
    }

    #[inline]
    pub fn projection_scale(&self) -> f64 {
        self.projection_scale
    }

    /// Rotates direction and plane together, keeping them orthogonal and the
    /// plane length (the field of view) unchanged.
    pub fn rotate(&mut self, radians: f64) {
        let rotation = DVec2::from_angle(radians);
        self.direction = rotation.rotate(self.direction);
        self.plane = rotation.rotate(self.plane);
    }

    /// Ray through a screen column, `camera_x` in `[-1, 1]` left to right.
    #[inline]
    pub fn ray_direction(&self, camera_x: f64) -> DVec2 {
        self.direction + self.plane * camera_x
    }

    /// Vector pointing to the camera's right, matching `camera_x = +1`.
    #[inline]
    pub fn right(&self) -> DVec2 {
        self.direction.perp()
    }
}
