//! Shared utilities for the simkit sample scenes.
//!
//! The kernels work z-up; macroquad renders y-up. [`to_render`] and
//! [`from_render`] convert between the two.

use std::path::Path;

use macroquad::prelude::*;
use nalgebra::Point3;
use serde::de::DeserializeOwned;
use simkit::spring::Cloth;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub mod navigator;
pub mod scene;

pub use navigator::TreeNavigator;
pub use scene::{RenderVisitor, SceneObject, Shape};

/// Installs a `fmt` subscriber filtered by `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read { path: String, source: std::io::Error },
    #[error("cannot parse {path}: {source}")]
    Parse { path: String, source: serde_json::Error },
}

/// Loads a JSON configuration from `path`. Missing fields take their
/// defaults when `T` is `#[serde(default)]`.
pub fn load_config<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ConfigError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: display.clone(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Parse { path: display, source })
}

/// Configuration from the JSON file named by the first command-line
/// argument, or the default when no argument is given.
pub fn config_from_args<T: DeserializeOwned + Default>() -> Result<T, ConfigError> {
    match std::env::args().nth(1) {
        Some(path) => {
            let config = load_config(&path)?;
            info!(%path, "loaded scene configuration");
            Ok(config)
        }
        None => Ok(T::default()),
    }
}

/// Converts a z-up kernel point into macroquad's y-up space.
pub fn to_render(p: Point3<f32>) -> Vec3 {
    vec3(p.x, p.z, -p.y)
}

/// Inverse of [`to_render`].
pub fn from_render(v: Vec3) -> Point3<f32> {
    Point3::new(v.x, -v.z, v.y)
}

/// [`to_render`] for double-precision kernel output.
pub fn to_render_f64(p: Point3<f64>) -> Vec3 {
    to_render(p.cast::<f32>())
}

/// Draws the cloth as a wireframe of its springs with a dot per particle.
pub fn draw_cloth(cloth: &Cloth, color: Color) {
    let surface = cloth.surface();
    let network = surface.network();
    for spring in network.springs() {
        draw_line_3d(
            to_render_f64(network.position(spring.a)),
            to_render_f64(network.position(spring.b)),
            color,
        );
    }
    for i in 0..network.len() {
        let marker = if network.is_pinned(i) { RED } else { WHITE };
        draw_cube(to_render_f64(network.position(i)), Vec3::splat(0.015), None, marker);
    }
}

/// Orbit camera for 3D scene navigation.
pub struct OrbitCamera {
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub target: Vec3,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl OrbitCamera {
    pub fn new(distance: f32, yaw: f32, pitch: f32) -> Self {
        Self {
            distance,
            yaw,
            pitch,
            target: Vec3::ZERO,
            zoom_speed: 0.5,
            min_distance: 1.0,
            max_distance: 50.0,
        }
    }

    /// Sets the scroll zoom speed and distance limits.
    pub fn with_zoom(mut self, speed: f32, min: f32, max: f32) -> Self {
        self.zoom_speed = speed;
        self.min_distance = min;
        self.max_distance = max;
        self
    }

    /// Sets the camera target in kernel coordinates.
    pub fn with_target(mut self, target: Point3<f32>) -> Self {
        self.target = to_render(target);
        self
    }

    /// Mouse drag and arrow keys rotate, the wheel zooms.
    pub fn update(&mut self) {
        if is_mouse_button_down(MouseButton::Left) {
            let delta = mouse_delta_position();
            self.yaw -= delta.x * 2.0;
            self.pitch -= delta.y * 2.0;
        }
        if is_key_down(KeyCode::Left) {
            self.yaw += 0.02;
        }
        if is_key_down(KeyCode::Right) {
            self.yaw -= 0.02;
        }
        if is_key_down(KeyCode::Up) {
            self.pitch += 0.02;
        }
        if is_key_down(KeyCode::Down) {
            self.pitch -= 0.02;
        }
        self.pitch = self.pitch.clamp(-1.5, 1.5);

        let scroll = mouse_wheel().1;
        self.distance = (self.distance - scroll * self.zoom_speed)
            .clamp(self.min_distance, self.max_distance);
    }

    /// Camera position in render space.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + vec3(x, y, z)
    }

    pub fn to_camera3d(&self) -> Camera3D {
        Camera3D {
            position: self.position(),
            up: Vec3::Y,
            target: self.target,
            ..Default::default()
        }
    }

    /// Camera position in kernel coordinates, for BSP traversal.
    pub fn eye_point(&self) -> Point3<f32> {
        from_render(self.position())
    }
}

/// Draws the kernel's x, y and z axes in red, green and blue.
pub fn draw_axes(length: f32) {
    let origin = Point3::origin();
    draw_line_3d(to_render(origin), to_render(Point3::new(length, 0.0, 0.0)), RED);
    draw_line_3d(to_render(origin), to_render(Point3::new(0.0, length, 0.0)), GREEN);
    draw_line_3d(to_render(origin), to_render(Point3::new(0.0, 0.0, length)), BLUE);
}

#[cfg(test)]
mod tests {
    use super::*;
    use simkit::spring::ClothConfig;

    #[test]
    fn render_conversion_round_trips() {
        let p = Point3::new(1.0, 2.0, 3.0);
        assert_eq!(to_render(p), vec3(1.0, 3.0, -2.0));
        assert_eq!(from_render(to_render(p)), p);
    }

    #[test]
    fn missing_config_file_is_reported() {
        let err = load_config::<ClothConfig>("/nonexistent/cloth.json").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
