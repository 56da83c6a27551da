use crate::core::framebuffer::FrameBuffer;
use crate::core::math::transform::MatrixStack;
use crate::io::config::Config;
use crate::pipeline::renderer::Renderer;
use crate::pipeline::shaders::fixed::FixedFunctionShader;
use crate::scene::animation::BallMode;
use crate::scene::material::{Material, TexEnvMode};
use crate::scene::mesh::Mesh;
use crate::scene::texture::TextureKind;
use crate::scene::world::World;
use nalgebra::{Matrix4, Point3, Vector2, Vector3};
use rayon::prelude::*;

/// One bar of the goal frame: an open cylinder along its local +Z.
#[derive(Debug, Clone, Copy)]
pub struct GoalPart {
    pub name: &'static str,
    pub translate: [f32; 3],
    /// Degrees about X, then about Y.
    pub rotate: [f32; 2],
    pub radius: f32,
    pub height: f32,
}

pub const GOAL_FRAME: [GoalPart; 6] = [
    GoalPart {
        name: "crossbar",
        translate: [-315.0, 500.0, -240.0],
        rotate: [90.0, 90.0],
        radius: 5.0,
        height: 400.0,
    },
    GoalPart {
        name: "left post",
        translate: [-310.0, 900.0, -240.0],
        rotate: [90.0, 0.0],
        radius: 7.0,
        height: 1000.0,
    },
    GoalPart {
        name: "right post",
        translate: [90.0, 900.0, -240.0],
        rotate: [90.0, 0.0],
        radius: 7.0,
        height: 1000.0,
    },
    GoalPart {
        name: "left stay",
        translate: [-310.0, 290.0, -240.0],
        rotate: [135.0, 0.0],
        radius: 7.0,
        height: 700.0,
    },
    GoalPart {
        name: "right stay",
        translate: [90.0, 290.0, -240.0],
        rotate: [135.0, 0.0],
        radius: 7.0,
        height: 700.0,
    },
    GoalPart {
        name: "rear bar",
        translate: [-315.0, -205.0, -735.0],
        rotate: [0.0, 90.0],
        radius: 7.0,
        height: 400.0,
    },
];

const CYLINDER_SLICES: u32 = 20;
const CYLINDER_STACKS: u32 = 4;
const BALL_SCALE: f32 = 0.2;

/// Draws the pitch, the goal and the ball from a borrowed [`World`].
///
/// The static geometry is built once; materials are rebuilt per frame from the
/// world's texture set.
pub struct ScenePass {
    clear_color: Vector3<f32>,
    ground: Mesh,
    goal: Vec<(GoalPart, Mesh)>,
}

impl ScenePass {
    pub fn new(config: &Config) -> Self {
        let ground = Mesh::create_quad(
            [
                Point3::new(-200.0, -320.0, -1800.0),
                Point3::new(200.0, -320.0, -1800.0),
                Point3::new(200.0, -320.0, 1800.0),
                Point3::new(-200.0, -320.0, 1800.0),
            ],
            [
                Vector2::new(1.0, 0.0),
                Vector2::new(0.0, 0.0),
                Vector2::new(1.0, 1.0),
                Vector2::new(0.0, 1.0),
            ],
            Vector3::y(),
            0,
        );

        let goal = GOAL_FRAME
            .iter()
            .map(|part| {
                let mesh = Mesh::create_cylinder(
                    part.radius,
                    part.radius,
                    part.height,
                    CYLINDER_SLICES,
                    CYLINDER_STACKS,
                    0,
                );
                (*part, mesh)
            })
            .collect();

        Self {
            clear_color: Vector3::from(config.render.clear_color),
            ground,
            goal,
        }
    }

    pub fn render(&self, world: &World, renderer: &mut Renderer) {
        renderer.clear(self.clear_color);

        let camera = world.camera();
        let projection = camera.projection_matrix();
        let view = world.view();
        let lights = world.lights();
        let texture_scale = world.texture_scale();
        let shader_for = |modelview: Matrix4<f32>| {
            FixedFunctionShader::new(modelview, projection, lights, texture_scale)
        };

        let mut stack = MatrixStack::new();
        stack
            .multiply(&camera.view_matrix())
            .translate(0.0, -260.0, -view.scene_distance)
            .scale_uniform(5.0)
            .rotate_x_deg(view.rotation_x)
            .rotate_y_deg(view.rotation_y);

        let grass = Material::textured(
            Vector3::repeat(0.2),
            world.texture(TextureKind::Grass).clone(),
            TexEnvMode::Add,
        );
        stack.scoped(|s| {
            s.translate(100.0, 1500.0, -160.0)
                .rotate_x_deg(3.0)
                .scale(7.0, 5.0, 5.0);
            renderer.draw_mesh(&self.ground, &shader_for(s.top()), Some(&grass));
        });

        let plastic = Material::textured(
            Vector3::repeat(1.0),
            world.texture(TextureKind::Plastic).clone(),
            TexEnvMode::Modulate,
        );
        for (part, mesh) in &self.goal {
            stack.scoped(|s| {
                let [x, y, z] = part.translate;
                s.translate(x, y, z + world.goal_distance())
                    .rotate_x_deg(part.rotate[0])
                    .rotate_y_deg(part.rotate[1]);
                renderer.draw_mesh(mesh, &shader_for(s.top()), Some(&plastic));
            });
        }

        let ball = world.ball();
        stack.scoped(|s| {
            s.scale_uniform(view.scale * BALL_SCALE);
            let p = ball.position();
            match ball.mode() {
                BallMode::ScriptedGoal => {
                    s.translate(0.0, p.y, p.z);
                }
                BallMode::Idle | BallMode::Bouncing => {
                    s.translate(0.0, p.y, 0.0).rotate_x_deg(ball.spin_degrees());
                }
            }
            renderer.draw_model(world.scene().model(), &shader_for(s.top()));
        });

        debug_assert_eq!(stack.depth(), 0);
    }
}

/// Resolves the framebuffer into tightly packed 8-bit RGBA rows.
pub fn framebuffer_to_rgba(framebuffer: &FrameBuffer) -> Vec<u8> {
    let mut pixels = vec![0u8; framebuffer.width * framebuffer.height * 4];
    if framebuffer.width == 0 {
        return pixels;
    }
    pixels
        .par_chunks_mut(framebuffer.width * 4)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, pixel) in row.chunks_exact_mut(4).enumerate() {
                let color = framebuffer.get_pixel(x, y).unwrap_or_else(Vector3::zeros);
                let to_byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
                pixel.copy_from_slice(&[to_byte(color.x), to_byte(color.y), to_byte(color.z), 255]);
            }
        });
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_default(width: usize, height: usize) -> (World, Renderer, ScenePass) {
        let mut config = Config::default();
        config.render.width = width;
        config.render.height = height;
        let world = World::new(&config).unwrap();
        let mut renderer = Renderer::new(width, height, 1);
        let pass = ScenePass::new(&config);
        pass.render(&world, &mut renderer);
        (world, renderer, pass)
    }

    fn count_not_clear(renderer: &Renderer) -> usize {
        let mut n = 0;
        for y in 0..renderer.height() {
            for x in 0..renderer.width() {
                if renderer.framebuffer.depth_at(x, y).is_some_and(f32::is_finite) {
                    n += 1;
                }
            }
        }
        n
    }

    #[test]
    fn default_frame_draws_geometry() {
        let (_, renderer, _) = render_default(160, 120);
        let covered = count_not_clear(&renderer);
        assert!(covered > 0, "nothing was rasterized");
        assert!(covered < 160 * 120, "geometry should not cover the whole view");
    }

    #[test]
    fn ball_is_drawn_at_the_screen_centre() {
        // The ball sits on the view axis at the default distance
        let (world, renderer, _) = render_default(200, 150);
        assert_eq!(world.ball().position(), nalgebra::Vector3::zeros());
        let mut hit = false;
        for y in 60..90 {
            for x in 85..115 {
                if renderer.framebuffer.depth_at(x, y).is_some_and(f32::is_finite) {
                    hit = true;
                }
            }
        }
        assert!(hit);
    }

    #[test]
    fn rgba_output_is_opaque_and_sized() {
        let (_, renderer, _) = render_default(64, 48);
        let rgba = framebuffer_to_rgba(&renderer.framebuffer);
        assert_eq!(rgba.len(), 64 * 48 * 4);
        assert!(rgba.chunks_exact(4).all(|p| p[3] == 255));
    }

    #[test]
    fn goal_frame_has_six_bars() {
        assert_eq!(GOAL_FRAME.len(), 6);
        assert!(GOAL_FRAME.iter().all(|p| p.radius > 0.0 && p.height > 0.0));
    }
}
