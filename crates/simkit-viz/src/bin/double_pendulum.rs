use std::collections::VecDeque;
use std::f64::consts::PI;

use macroquad::prelude::*;
use nalgebra::Point2;
use simkit::ode::Simulation;
use simkit::scenarios::DoublePendulum;
use simkit_viz::{config_from_args, init_tracing};
use tracing::{error, info};

const TIME_STEP: f64 = 0.01;

/// Positions of the lower bob kept for its trail.
const TRAIL_LENGTH: usize = 500;

/// Pixels per model unit.
const SCALE: f32 = 1.2;

fn start(params: DoublePendulum) -> Option<Simulation<DoublePendulum>> {
    let initial = DoublePendulum::initial_state(0.125 * PI, 0.0, 0.25 * PI, 0.0);
    match Simulation::new(params, 0.0, TIME_STEP, &initial) {
        Ok(sim) => Some(sim),
        Err(err) => {
            error!(%err, "invalid double pendulum");
            None
        }
    }
}

fn to_screen(pivot: Vec2, p: Point2<f64>) -> Vec2 {
    pivot + vec2(p.x as f32, -p.y as f32) * SCALE
}

#[macroquad::main("Double Pendulum")]
async fn main() {
    init_tracing();

    let params: DoublePendulum = match config_from_args() {
        Ok(params) => params,
        Err(err) => {
            error!(%err, "falling back to the default pendulum");
            DoublePendulum::default()
        }
    };
    let Some(mut sim) = start(params) else {
        return;
    };
    info!(?params, "double pendulum ready");

    let mut trail: VecDeque<Vec2> = VecDeque::with_capacity(TRAIL_LENGTH);

    loop {
        if is_key_pressed(KeyCode::R) {
            if let Some(fresh) = start(params) {
                sim = fresh;
                trail.clear();
            }
        }
        if let Err(err) = sim.update() {
            error!(%err, "double pendulum diverged, restarting");
            if let Some(fresh) = start(params) {
                sim = fresh;
                trail.clear();
            }
        }

        let pivot = vec2(screen_width() / 2.0, screen_height() / 3.0);
        let (first, second) = sim.positions();
        let (b1, b2) = (to_screen(pivot, first), to_screen(pivot, second));
        if trail.len() == TRAIL_LENGTH {
            trail.pop_front();
        }
        trail.push_back(b2);

        clear_background(Color::from_rgba(20, 20, 30, 255));
        for (a, b) in trail.iter().zip(trail.iter().skip(1)) {
            draw_line(a.x, a.y, b.x, b.y, 1.0, DARKGRAY);
        }
        draw_line(pivot.x, pivot.y, b1.x, b1.y, 2.0, LIGHTGRAY);
        draw_line(b1.x, b1.y, b2.x, b2.y, 2.0, LIGHTGRAY);
        draw_circle(b1.x, b1.y, 8.0, ORANGE);
        draw_circle(b2.x, b2.y, 10.0, SKYBLUE);

        let status = format!("t = {:.2}  E = {:.1}", sim.time(), sim.energy());
        draw_text(&status, 10.0, 25.0, 20.0, WHITE);
        draw_text("R restarts", 10.0, 45.0, 16.0, DARKGRAY);

        next_frame().await
    }
}
