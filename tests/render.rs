use std::sync::Arc;

use raycaster::{EngineConfig, MapData, MovementInputs, Player, Renderer, ScreenBuffer, demo};

fn arena() -> MapData {
    let library = Arc::new(demo::demo_library().unwrap());
    MapData::load(&demo::open_arena(24, 24), library).unwrap()
}

#[test]
fn wall_grows_while_walking_towards_it() {
    let config = EngineConfig::default();
    let map = arena();
    let renderer = Renderer::new(&config);
    let mut player = Player::spawn(&map, &config);

    let (w, h) = (config.render_width, config.render_height);
    let centre = w / 2;

    let first = renderer.column_strip(&map, &player.camera, centre, w, h);
    assert!(first.draw_start < first.draw_end);
    // east wall face at x = 23, eleven cells ahead of the spawn point
    assert_eq!(first.line_height, (h as f64 / 11.0) as i64);

    let mut previous = first;
    for _ in 0..10 {
        player.update(&map, MovementInputs::FORWARD, 0.1);
        let strip = renderer.column_strip(&map, &player.camera, centre, w, h);
        assert!(strip.draw_start < strip.draw_end);
        assert!(strip.line_height > previous.line_height);
        assert_eq!(strip.draw_start + strip.draw_end, h);
        previous = strip;
    }
}

#[test]
fn walking_into_the_wall_stops_short_of_it() {
    let config = EngineConfig::default();
    let map = arena();
    let mut player = Player::spawn(&map, &config);

    for _ in 0..100 {
        player.update(&map, MovementInputs::FORWARD, 0.1);
    }
    let x = player.camera.position.x;
    assert!(x < 23.0 - config.player_radius + 1e-9, "walked into the wall at {x}");
    assert!(x > 22.0);
}

#[test]
fn frame_is_fully_drawn() {
    let config = EngineConfig::default();
    let map = arena();
    let renderer = Renderer::new(&config);
    let player = Player::spawn(&map, &config);

    let mut frame = ScreenBuffer::new(config.render_width, config.render_height, config.background);
    renderer.render_frame(&mut frame, &map, &player.camera);

    let (w, h) = (frame.width(), frame.height());
    // wall in the middle, ceiling at the top, floor at the bottom
    assert_ne!(frame.get(w / 2, h / 2), config.background);
    assert_ne!(frame.get(w / 2, 0), config.background);
    assert_ne!(frame.get(w / 2, h - 1), config.background);

    let rows = frame.row_major();
    assert_eq!(rows.len(), w * h);
    assert_eq!(rows[(h / 2) * w + w / 2], frame.get(w / 2, h / 2));
}

#[test]
fn demo_level_renders_every_column() {
    let config = EngineConfig::default();
    let library = Arc::new(demo::demo_library().unwrap());
    let map = MapData::load(&demo::demo_map(), library).unwrap();
    let renderer = Renderer::new(&config);
    let player = Player::spawn(&map, &config);

    let (w, h) = (160, 120);
    let mut frame = ScreenBuffer::new(w, h, config.background);
    let mut camera = player.camera;
    camera.set_fov_from_vertical(config.fov_y_deg, w as f64 / h as f64);
    renderer.render_frame(&mut frame, &map, &camera);

    for x in 0..w {
        let strip = renderer.column_strip(&map, &camera, x, w, h);
        assert!(strip.draw_start < strip.draw_end, "column {x} has no wall");
        assert_ne!(frame.get(x, h / 2), config.background);
    }
}
