use crate::core::rasterizer::CullMode;
use crate::io::config::Config;
use crate::io::image::save_framebuffer;
use crate::pipeline::passes::ScenePass;
use crate::pipeline::renderer::Renderer;
use crate::scene::world::World;
use crate::ui::state::ViewerState;
use crate::ui::viewer::ViewerApp;
use log::info;
use std::path::PathBuf;
use std::time::Instant;

/// Width reserved for the side panel on top of the configured viewport.
const SIDE_PANEL_WIDTH: f32 = 240.0;

fn build_renderer(config: &Config) -> Renderer {
    Renderer::new(
        config.render.width,
        config.render.height,
        config.render.samples,
    )
    .with_cull_mode(CullMode::from_name(&config.render.cull_mode))
}

/// Opens the interactive window and blocks until it is closed.
pub fn run_gui(world: World, config: &Config) -> Result<(), String> {
    info!(
        "Starting GUI mode ({}x{})...",
        config.render.width, config.render.height
    );
    info!("Controls: E/D tilt, S/F turn, +/- zoom, F4 open model, V shoot, B cancel, F10 exit");

    let app = ViewerApp::new(ViewerState::new(world), build_renderer(config), config);
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([
                config.render.width as f32 + SIDE_PANEL_WIDTH,
                config.render.height as f32,
            ])
            .with_min_inner_size([480.0, 320.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Goal Scene",
        options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )
    .map_err(|e| format!("GUI failed: {}", e))
}

/// Settings of a windowless run.
#[derive(Debug, Clone)]
pub struct HeadlessOptions {
    /// Animation ticks before the frame is rendered.
    pub frames: usize,
    /// Start the shot on goal before ticking.
    pub start_goal: bool,
    pub output: PathBuf,
}

/// Advances the animation, renders one frame and writes it to `options.output`.
pub fn run_headless(mut world: World, config: &Config, options: &HeadlessOptions) -> Result<(), String> {
    info!(
        "Starting headless mode: {} ticks{}",
        options.frames,
        if options.start_goal { " after kick-off" } else { "" }
    );
    let start_time = Instant::now();

    if options.start_goal {
        world.start_goal();
    }
    for _ in 0..options.frames {
        world.advance_frame();
    }

    let mut renderer = build_renderer(config);
    world.resize(renderer.width(), renderer.height());
    ScenePass::new(config).render(&world, &mut renderer);
    info!("Render completed in {:.2?}", start_time.elapsed());

    save_framebuffer(&renderer.framebuffer, &options.output)?;
    info!("Done.");
    Ok(())
}
