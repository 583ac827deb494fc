use bytemuck::{Pod, Zeroable};
use cubefield_render::RenderView;
use cubefield_scene::{Cube, DirectionalLight, Ground, MaterialParams, Scene};
use glam::{Mat4, Vec3};

/// Depth offset subtracted before the shadow comparison.
const SHADOW_BIAS: f32 = 0.002;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct SceneUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub light_view_proj: [[f32; 4]; 4],
    /// Unit vector towards the light (xyz).
    pub light_dir: [f32; 4],
    /// Linear light color premultiplied by intensity (rgb).
    pub light_color: [f32; 4],
    pub ambient: [f32; 4],
    pub camera_pos: [f32; 4],
    /// metalness, roughness, transmission, thickness
    pub material: [f32; 4],
    /// x: shadows enabled, y: depth bias
    pub shadow_params: [f32; 4],
}

impl SceneUniforms {
    pub fn new(scene: &Scene, view: &RenderView, material: &MaterialParams, shadows: bool) -> Self {
        let (light_view_proj, light_dir, light_color, cast_shadow) = match scene.directional_light() {
            Some(light) => (
                light_view_projection(light),
                light.direction_to_light(),
                light.color.to_linear_rgba(light.intensity, 0.0),
                light.cast_shadow,
            ),
            None => (Mat4::IDENTITY, Vec3::Y, [0.0; 4], false),
        };
        let ambient = scene
            .ambient_light()
            .map(|a| a.color.to_linear_rgba(a.intensity, 0.0))
            .unwrap_or([0.0; 4]);
        let shadows_on = shadows && cast_shadow;

        Self {
            view_proj: view.view_projection().to_cols_array_2d(),
            light_view_proj: light_view_proj.to_cols_array_2d(),
            light_dir: light_dir.extend(0.0).to_array(),
            light_color,
            ambient,
            camera_pos: view.eye.extend(1.0).to_array(),
            material: [
                material.metalness,
                material.roughness,
                material.transmission,
                material.thickness,
            ],
            shadow_params: [if shadows_on { 1.0 } else { 0.0 }, SHADOW_BIAS, 0.0, 0.0],
        }
    }
}

/// Orthographic view-projection of the directional light's shadow camera.
pub fn light_view_projection(light: &DirectionalLight) -> Mat4 {
    let forward = (light.target - light.position).normalize_or(Vec3::NEG_Y);
    let up = if forward.abs_diff_eq(Vec3::Y, 1e-3) || forward.abs_diff_eq(Vec3::NEG_Y, 1e-3) {
        Vec3::Z
    } else {
        Vec3::Y
    };
    let view = Mat4::look_at_rh(light.position, light.target, up);
    let e = light.shadow_extent;
    let proj = Mat4::orthographic_rh(-e, e, -e, e, light.shadow_near, light.shadow_far);
    proj * view
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct InstanceData {
    pub model_0: [f32; 4],
    pub model_1: [f32; 4],
    pub model_2: [f32; 4],
    pub model_3: [f32; 4],
    pub color: [f32; 4],
    /// x: physical material weight (1 cube, 0 lambert ground), y: receives shadow
    pub params: [f32; 4],
}

impl InstanceData {
    fn new(model: Mat4, color: [f32; 4], physical: bool, receive_shadow: bool) -> Self {
        let cols = model.to_cols_array_2d();
        Self {
            model_0: cols[0],
            model_1: cols[1],
            model_2: cols[2],
            model_3: cols[3],
            color,
            params: [
                if physical { 1.0 } else { 0.0 },
                if receive_shadow { 1.0 } else { 0.0 },
                0.0,
                0.0,
            ],
        }
    }

    pub fn from_cube(cube: &Cube) -> Self {
        Self::new(cube.transform.to_matrix(), cube.color.to_linear_rgba(1.0, 1.0), true, false)
    }

    pub fn from_ground(ground: &Ground) -> Self {
        let model = Mat4::from_translation(Vec3::new(0.0, ground.height, 0.0));
        Self::new(model, ground.color.to_linear_rgba(1.0, 1.0), false, ground.receive_shadow)
    }
}

/// Instance data for every cube, in scene order.
pub(crate) fn cube_instances(scene: &Scene) -> Vec<InstanceData> {
    scene.cubes().map(InstanceData::from_cube).collect()
}

/// Instance data for the shadow-casting cubes only.
pub(crate) fn shadow_caster_instances(scene: &Scene) -> Vec<InstanceData> {
    scene
        .cubes()
        .filter(|c| c.cast_shadow)
        .map(InstanceData::from_cube)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubefield_scene::SceneBuilder;

    #[test]
    fn uniform_layout_is_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<SceneUniforms>() % 16, 0);
        assert_eq!(std::mem::size_of::<SceneUniforms>(), 224);
        assert_eq!(std::mem::size_of::<InstanceData>(), 96);
    }

    #[test]
    fn light_target_maps_inside_shadow_frustum() {
        let scene = SceneBuilder::default().build_seeded(1);
        let light = scene.directional_light().unwrap();
        let m = light_view_projection(light);
        // the target sits ~6.2 units away, beyond the default far plane of 5
        let near_point = light.position + (light.target - light.position).normalize() * 3.0;
        let ndc = m.project_point3(near_point);
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
        assert!(ndc.z > 0.0 && ndc.z < 1.0, "depth {}", ndc.z);
    }

    #[test]
    fn vertical_light_uses_alternate_up() {
        let scene = SceneBuilder::default().build_seeded(1);
        let mut light = scene.directional_light().unwrap().clone();
        light.position = Vec3::new(0.0, 5.0, 0.0);
        let m = light_view_projection(&light);
        assert!(!m.col(0).x.is_nan());
    }

    #[test]
    fn instances_follow_scene() {
        let scene = SceneBuilder::default().build_seeded(2);
        let instances = cube_instances(&scene);
        assert_eq!(instances.len(), 100);
        let first = scene.cubes().next().unwrap();
        assert_eq!(instances[0].model_3[0], first.transform.position.x);
        assert_eq!(instances[0].model_3[1], first.transform.position.y);
        assert_eq!(instances[0].params, [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(shadow_caster_instances(&scene).len(), 100);
    }

    #[test]
    fn ground_instance_receives_shadow() {
        let scene = SceneBuilder::default().build_seeded(2);
        let ground = InstanceData::from_ground(scene.ground().unwrap());
        assert_eq!(ground.model_3[1], -2.4);
        assert_eq!(ground.params[1], 1.0);
        assert_eq!(ground.params[0], 0.0);
    }

    #[test]
    fn shadows_flag_reaches_uniforms() {
        let scene = SceneBuilder::default().build_seeded(2);
        let view = RenderView::default();
        let on = SceneUniforms::new(&scene, &view, &MaterialParams::default(), true);
        let off = SceneUniforms::new(&scene, &view, &MaterialParams::default(), false);
        assert_eq!(on.shadow_params[0], 1.0);
        assert_eq!(off.shadow_params[0], 0.0);
        assert_eq!(on.material, [0.15, 0.15, 0.5, 0.5]);
    }
}
