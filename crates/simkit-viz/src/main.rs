use macroquad::prelude::*;
use simkit::bsp::DrawOrder;
use simkit_viz::{draw_axes, init_tracing, scene, OrbitCamera, TreeNavigator};
use tracing::{error, info};

#[macroquad::main("BSP Room")]
async fn main() {
    init_tracing();

    let tree = match scene::room() {
        Ok(tree) => tree,
        Err(err) => {
            error!(%err, "cannot build the room");
            return;
        }
    };
    info!(items = tree.item_count(), depth = tree.depth(), "room built");

    let mut camera = OrbitCamera::new(7.0, 0.6, 0.5).with_zoom(0.5, 2.0, 20.0);
    let mut navigator = TreeNavigator::new();
    let mut order = DrawOrder::BackToFront;

    loop {
        camera.update();
        navigator.update(&tree);
        if is_key_pressed(KeyCode::Space) {
            order = match order {
                DrawOrder::BackToFront => DrawOrder::FrontToBack,
                DrawOrder::FrontToBack => DrawOrder::BackToFront,
            };
        }

        clear_background(Color::from_rgba(20, 20, 30, 255));
        set_camera(&camera.to_camera3d());
        let drawn = navigator.render(&tree, camera.eye_point(), order);
        draw_axes(1.0);
        set_default_camera();

        draw_text("BSP Room", 10.0, 25.0, 20.0, WHITE);
        draw_text(&format!("{order:?}: {}", drawn.join(", ")), 10.0, 45.0, 18.0, GRAY);
        navigator.draw_ui(&tree, 70.0);
        let help = "Drag to rotate, scroll to zoom, space toggles order";
        draw_text(help, 10.0, 155.0, 16.0, DARKGRAY);
        draw_text(&format!("FPS: {}", get_fps()), 10.0, 175.0, 16.0, DARKGRAY);

        next_frame().await
    }
}
