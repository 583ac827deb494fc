use crate::config::SceneConfig;
use crate::scene::{AmbientLight, Cube, DirectionalLight, GridCell, Ground, Scene, SceneNode};
use cubefield_common::{Color, Transform};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Builds a [`Scene`] from a parameter table.
///
/// Every call to a `build*` method produces a fresh scene; nothing is shared
/// between the scenes a builder produces.
#[derive(Debug, Clone, Default)]
pub struct SceneBuilder {
    config: SceneConfig,
}

impl SceneBuilder {
    pub fn new(config: SceneConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Build with colors and heights drawn from an entropy-seeded RNG.
    pub fn build(&self) -> Scene {
        self.build_with_rng(&mut StdRng::from_entropy())
    }

    /// Build reproducibly from a seed.
    pub fn build_seeded(&self, seed: u64) -> Scene {
        self.build_with_rng(&mut StdRng::seed_from_u64(seed))
    }

    /// Build using the caller's RNG.
    ///
    /// Insertion order: cubes (row-major), ground, directional light, ambient light.
    pub fn build_with_rng<R: Rng>(&self, rng: &mut R) -> Scene {
        let mut scene = Scene::new();
        let grid = &self.config.cubes;
        let columns = grid.columns.max(1);

        for i in 0..grid.count {
            let cell = GridCell::new(
                grid.origin + (i % columns) as i32,
                grid.origin + (i / columns) as i32,
            );

            let color = Color::from_rgb8(
                rng.gen_range(0..=255),
                rng.gen_range(0..=255),
                rng.gen_range(0..=255),
            );
            let base_height = grid.min_height + rng.gen_range(0.0..1.0_f32) * grid.height_range;

            let transform = Transform {
                position: Vec3::new(
                    cell.x as f32 + grid.cell_offset,
                    base_height,
                    cell.z as f32 + grid.cell_offset,
                ),
                scale: Vec3::splat(grid.size),
                ..Transform::default()
            };

            scene.insert(SceneNode::Cube(Cube {
                transform,
                base_height,
                cell,
                phase_index: i,
                color,
                cast_shadow: grid.cast_shadow,
            }));
        }

        let ground = &self.config.ground;
        scene.insert(SceneNode::Ground(Ground {
            size: ground.size,
            height: ground.height,
            color: ground.color,
            receive_shadow: ground.receive_shadow,
        }));

        let light = &self.config.directional_light;
        scene.insert(SceneNode::DirectionalLight(DirectionalLight {
            color: light.color,
            intensity: light.intensity,
            position: light.position,
            target: light.target,
            cast_shadow: light.cast_shadow,
            shadow_map_size: light.shadow_map_size,
            shadow_near: light.shadow_near,
            shadow_far: light.shadow_far,
            shadow_extent: light.shadow_extent,
        }));

        let ambient = &self.config.ambient_light;
        scene.insert(SceneNode::AmbientLight(AmbientLight {
            color: ambient.color,
            intensity: ambient.intensity,
        }));

        tracing::debug!(
            cubes = grid.count,
            nodes = scene.node_count(),
            "built scene"
        );
        scene
    }
}
