use goal_scene::app::{HeadlessOptions, run_headless};
use goal_scene::error::WorldError;
use goal_scene::io::config::Config;
use goal_scene::pipeline::passes::{ScenePass, framebuffer_to_rgba};
use goal_scene::pipeline::renderer::Renderer;
use goal_scene::scene::asset::AssetSource;
use goal_scene::scene::world::World;
use std::path::PathBuf;

fn small_config() -> Config {
    let mut config = Config::default();
    config.render.width = 160;
    config.render.height = 120;
    config
}

fn render(world: &World, config: &Config) -> Vec<u8> {
    let mut renderer = Renderer::new(config.render.width, config.render.height, 1);
    ScenePass::new(config).render(world, &mut renderer);
    framebuffer_to_rgba(&renderer.framebuffer)
}

#[test]
fn headless_run_writes_the_frame() {
    let config = small_config();
    let world = World::new(&config).unwrap();
    let output = std::env::temp_dir().join(format!("goal-scene-headless-{}.png", std::process::id()));

    let options = HeadlessOptions {
        frames: 12,
        start_goal: true,
        output: output.clone(),
    };
    run_headless(world, &config, &options).unwrap();

    let image = image::open(&output).unwrap();
    assert_eq!((image.width(), image.height()), (160, 120));
    let _ = std::fs::remove_file(&output);
}

#[test]
fn the_shot_changes_the_picture_and_ends() {
    let config = small_config();
    let mut world = World::new(&config).unwrap();
    let before = render(&world, &config);

    world.start_goal();
    for _ in 0..15 {
        world.advance_frame();
    }
    assert!(world.ball().is_scripted());
    assert!(world.ball().position().z < 0.0);
    let during = render(&world, &config);
    assert_ne!(before, during);

    for _ in 0..20 {
        world.advance_frame();
    }
    assert!(world.ball().is_automatic());
}

#[test]
fn failed_reload_keeps_rendering_the_old_scene() {
    let config = small_config();
    let mut world = World::new(&config).unwrap();
    let before = render(&world, &config);

    let result = world.reload_scene(&PathBuf::from("/no/such/model.gltf"));
    assert!(matches!(result, Err(WorldError::Load { .. })));
    assert_eq!(world.scene_source(), &AssetSource::Builtin);
    assert_eq!(render(&world, &config), before);
}
