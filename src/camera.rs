//! Fixed 2D orthographic camera over the simulation world.
//!
//! The world is `world_width` units wide and centered on the origin; its
//! height follows the viewport aspect ratio. Pointer coordinates are mapped
//! with plain f32 arithmetic so the mapping is reproducible bit for bit.

use glam::{Mat4, Vec2, Vec3};

const MIN_SCREEN_EXTENT: f32 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Camera2D {
    world_width: f32,
    screen_width: f32,
    screen_height: f32,
    near_plane: f32,
    far_plane: f32,
}

impl Camera2D {
    pub fn new(world_width: f32, screen_width: u32, screen_height: u32) -> Self {
        Self {
            world_width,
            screen_width: (screen_width as f32).max(MIN_SCREEN_EXTENT),
            screen_height: (screen_height as f32).max(MIN_SCREEN_EXTENT),
            near_plane: 0.1,
            far_plane: 10.0,
        }
    }

    pub fn world_width(&self) -> f32 {
        self.world_width
    }

    pub fn world_height(&self) -> f32 {
        self.world_width * (self.screen_height / self.screen_width)
    }

    pub fn screen_size(&self) -> (f32, f32) {
        (self.screen_width, self.screen_height)
    }

    pub fn resize(&mut self, screen_width: u32, screen_height: u32) {
        if screen_width > 0 && screen_height > 0 {
            self.screen_width = screen_width as f32;
            self.screen_height = screen_height as f32;
        }
    }

    /// Same world mapping at a different viewport size (offscreen captures).
    pub fn with_screen_size(&self, screen_width: u32, screen_height: u32) -> Self {
        let mut camera = self.clone();
        camera.resize(screen_width, screen_height);
        camera
    }

    pub fn set_world_width(&mut self, world_width: f32) {
        self.world_width = world_width;
    }

    pub fn set_depth_range(&mut self, near_plane: f32, far_plane: f32) {
        self.near_plane = near_plane;
        self.far_plane = far_plane;
    }

    pub fn screen_to_world(&self, px: f32, py: f32) -> Vec2 {
        let x = (px / self.screen_width - 0.5) * self.world_width;
        let y = (0.5 - py / self.screen_height) * self.world_height();
        Vec2::new(x, y)
    }

    /// World units covered by one screen pixel.
    pub fn pixel_size(&self) -> f32 {
        self.world_width / self.screen_width
    }

    /// Projection times view. Geometry lives on the z = 0 plane; the eye sits
    /// halfway between the near and far planes so that plane stays visible.
    pub fn view_projection_matrix(&self) -> Mat4 {
        let half_width = self.world_width / 2.0;
        let half_height = self.world_height() / 2.0;
        let projection = Mat4::orthographic_rh(
            -half_width,
            half_width,
            -half_height,
            half_height,
            self.near_plane,
            self.far_plane,
        );
        let eye_distance = (self.near_plane + self.far_plane) / 2.0;
        let view = Mat4::from_translation(Vec3::new(0.0, 0.0, -eye_distance));
        projection * view
    }

    pub fn view_projection_matrix_cols(&self) -> [[f32; 4]; 4] {
        self.view_projection_matrix().to_cols_array_2d()
    }
}
