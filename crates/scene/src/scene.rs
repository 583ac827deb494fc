use cubefield_common::{Color, Transform};
use glam::Vec3;

/// Integer grid cell of a cube on the horizontal (x/z) plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCell {
    pub x: i32,
    pub z: i32,
}

impl GridCell {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

/// One animated cube.
#[derive(Debug, Clone, PartialEq)]
pub struct Cube {
    pub transform: Transform,
    /// Height the cube oscillates around.
    pub base_height: f32,
    pub cell: GridCell,
    /// Multiplier for the per-cube animation phase, fixed at creation.
    pub phase_index: u32,
    /// Assigned once by the builder and never changed.
    pub color: Color,
    pub cast_shadow: bool,
}

/// The ground plane.
#[derive(Debug, Clone, PartialEq)]
pub struct Ground {
    pub size: f32,
    pub height: f32,
    pub color: Color,
    pub receive_shadow: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
    pub position: Vec3,
    pub target: Vec3,
    pub cast_shadow: bool,
    pub shadow_map_size: u32,
    pub shadow_near: f32,
    pub shadow_far: f32,
    pub shadow_extent: f32,
}

impl DirectionalLight {
    /// Unit vector pointing from the target towards the light.
    pub fn direction_to_light(&self) -> Vec3 {
        (self.position - self.target).normalize_or(Vec3::Y)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

/// A drawable object or light source in the scene graph.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneNode {
    Cube(Cube),
    Ground(Ground),
    DirectionalLight(DirectionalLight),
    AmbientLight(AmbientLight),
}

/// Insertion-ordered scene graph.
///
/// Nodes are only added by [`crate::SceneBuilder`]; once built, the node count
/// never changes. Cube transforms are the only state mutated per frame.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    nodes: Vec<SceneNode>,
    elapsed: f32,
}

impl Scene {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, node: SceneNode) {
        self.nodes.push(node);
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Elapsed time of the most recent animation step.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub(crate) fn set_elapsed(&mut self, elapsed: f32) {
        self.elapsed = elapsed;
    }

    pub fn cubes(&self) -> impl Iterator<Item = &Cube> {
        self.nodes.iter().filter_map(|n| match n {
            SceneNode::Cube(c) => Some(c),
            _ => None,
        })
    }

    pub fn cubes_mut(&mut self) -> impl Iterator<Item = &mut Cube> {
        self.nodes.iter_mut().filter_map(|n| match n {
            SceneNode::Cube(c) => Some(c),
            _ => None,
        })
    }

    pub fn cube_count(&self) -> usize {
        self.cubes().count()
    }

    pub fn ground(&self) -> Option<&Ground> {
        self.nodes.iter().find_map(|n| match n {
            SceneNode::Ground(g) => Some(g),
            _ => None,
        })
    }

    pub fn directional_light(&self) -> Option<&DirectionalLight> {
        self.nodes.iter().find_map(|n| match n {
            SceneNode::DirectionalLight(l) => Some(l),
            _ => None,
        })
    }

    pub fn ambient_light(&self) -> Option<&AmbientLight> {
        self.nodes.iter().find_map(|n| match n {
            SceneNode::AmbientLight(l) => Some(l),
            _ => None,
        })
    }

    #[cfg(test)]
    pub(crate) fn reverse_nodes(&mut self) {
        self.nodes.reverse();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube(phase_index: u32) -> Cube {
        Cube {
            transform: Transform::default(),
            base_height: 1.0,
            cell: GridCell::new(phase_index as i32, 0),
            phase_index,
            color: Color::WHITE,
            cast_shadow: true,
        }
    }

    #[test]
    fn empty_scene() {
        let scene = Scene::new();
        assert_eq!(scene.node_count(), 0);
        assert_eq!(scene.cube_count(), 0);
        assert!(scene.ground().is_none());
        assert!(scene.directional_light().is_none());
    }

    #[test]
    fn typed_accessors_filter_nodes() {
        let mut scene = Scene::new();
        scene.insert(SceneNode::Cube(cube(0)));
        scene.insert(SceneNode::AmbientLight(AmbientLight {
            color: Color::WHITE,
            intensity: 1.0,
        }));
        scene.insert(SceneNode::Cube(cube(1)));

        assert_eq!(scene.node_count(), 3);
        assert_eq!(scene.cube_count(), 2);
        assert!(scene.ambient_light().is_some());
        let phases: Vec<u32> = scene.cubes().map(|c| c.phase_index).collect();
        assert_eq!(phases, vec![0, 1]);
    }

    #[test]
    fn reverse_keeps_count() {
        let mut scene = Scene::new();
        scene.insert(SceneNode::Cube(cube(0)));
        scene.insert(SceneNode::Cube(cube(1)));
        scene.reverse_nodes();
        assert_eq!(scene.cube_count(), 2);
        assert_eq!(scene.cubes().next().map(|c| c.phase_index), Some(1));
    }

    #[test]
    fn light_direction_is_normalized() {
        let light = DirectionalLight {
            color: Color::WHITE,
            intensity: 1.0,
            position: Vec3::new(2.0, 5.0, 3.0),
            target: Vec3::ZERO,
            cast_shadow: true,
            shadow_map_size: 256,
            shadow_near: 0.5,
            shadow_far: 5.0,
            shadow_extent: 5.0,
        };
        assert!((light.direction_to_light().length() - 1.0).abs() < 1e-6);
    }
}
