use macroquad::prelude::*;
use nalgebra::Point3;
use simkit::spring::{Cloth, ClothConfig};
use simkit_viz::{config_from_args, draw_axes, draw_cloth, init_tracing, OrbitCamera};
use tracing::{error, info};

/// Simulation steps per rendered frame.
const STEPS_PER_FRAME: usize = 2;

#[macroquad::main("Cloth")]
async fn main() {
    init_tracing();

    let config: ClothConfig = match config_from_args() {
        Ok(config) => config,
        Err(err) => {
            error!(%err, "falling back to the default cloth");
            ClothConfig::default()
        }
    };
    let mut cloth = match Cloth::new(&config) {
        Ok(cloth) => cloth,
        Err(err) => {
            error!(%err, "invalid cloth configuration");
            return;
        }
    };
    info!(rows = config.rows, cols = config.cols, seed = config.seed, "cloth ready");

    let mut camera = OrbitCamera::new(2.5, 0.3, 0.2)
        .with_zoom(0.2, 0.5, 10.0)
        .with_target(Point3::new(0.5, 0.0, 0.5));
    let mut paused = false;

    loop {
        camera.update();
        if is_key_pressed(KeyCode::Space) {
            paused = !paused;
        }
        if is_key_pressed(KeyCode::R) {
            if let Ok(fresh) = Cloth::new(&config) {
                cloth = fresh;
            }
        }
        if !paused {
            for _ in 0..STEPS_PER_FRAME {
                if let Err(err) = cloth.update() {
                    error!(%err, "cloth update failed, pausing");
                    paused = true;
                    break;
                }
            }
        }

        clear_background(Color::from_rgba(20, 20, 30, 255));
        set_camera(&camera.to_camera3d());
        draw_cloth(&cloth, SKYBLUE);
        draw_axes(0.3);
        set_default_camera();

        let status = format!("Cloth {}x{}  t = {:.2}", config.rows, config.cols, cloth.time());
        draw_text(&status, 10.0, 25.0, 20.0, WHITE);
        draw_text("Space pauses, R restarts", 10.0, 45.0, 16.0, DARKGRAY);

        next_frame().await
    }
}
