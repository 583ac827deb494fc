/// Shared uniform block; must match `SceneUniforms`.
macro_rules! uniforms_wgsl {
    () => {
        r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    light_view_proj: mat4x4<f32>,
    light_dir: vec4<f32>,
    light_color: vec4<f32>,
    ambient: vec4<f32>,
    camera_pos: vec4<f32>,
    material: vec4<f32>,
    shadow_params: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;
"#
    };
}

/// Lit, shadow-receiving surfaces: instanced cubes and the ground plane.
pub const SURFACE_SHADER: &str = concat!(
    uniforms_wgsl!(),
    r#"
@group(0) @binding(1)
var shadow_map: texture_depth_2d;
@group(0) @binding(2)
var shadow_sampler: sampler_comparison;

const INV_PI: f32 = 0.31830988618;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
    @location(7) params: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) color: vec4<f32>,
    @location(3) params: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);
    let world_normal = (model * vec4<f32>(vertex.normal, 0.0)).xyz;

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * world_pos;
    out.world_pos = world_pos.xyz;
    out.world_normal = normalize(world_normal);
    out.color = instance.color;
    out.params = instance.params;
    return out;
}

fn shadow_visibility(world_pos: vec3<f32>) -> f32 {
    let light_clip = uniforms.light_view_proj * vec4<f32>(world_pos, 1.0);
    let ndc = light_clip.xyz / light_clip.w;
    let uv = vec2<f32>(ndc.x * 0.5 + 0.5, -ndc.y * 0.5 + 0.5);
    let depth = ndc.z - uniforms.shadow_params.y;
    let visibility = textureSampleCompareLevel(shadow_map, shadow_sampler, uv, depth);
    let inside = all(uv >= vec2<f32>(0.0)) && all(uv <= vec2<f32>(1.0)) && ndc.z >= 0.0 && ndc.z <= 1.0;
    return select(1.0, visibility, inside);
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let n = normalize(in.world_normal);
    let v = normalize(uniforms.camera_pos.xyz - in.world_pos);
    let l = normalize(uniforms.light_dir.xyz);
    let albedo = in.color.rgb;
    let physical = in.params.x;

    let receives = in.params.y > 0.5 && uniforms.shadow_params.x > 0.5;
    let shadow = select(1.0, shadow_visibility(in.world_pos), receives);

    let metalness = uniforms.material.x * physical;
    let roughness = max(uniforms.material.y, 0.04);
    let transmission = uniforms.material.z * physical;
    let thickness = uniforms.material.w;

    let n_dot_l = max(dot(n, l), 0.0);
    let direct = uniforms.light_color.rgb * n_dot_l * shadow;
    let diffuse_color = albedo * (1.0 - metalness);
    var color = diffuse_color * (uniforms.ambient.rgb + direct) * INV_PI;

    // normalized Blinn-Phong lobe standing in for the GGX highlight
    let h = normalize(l + v);
    let r4 = roughness * roughness * roughness * roughness;
    let shininess = max(2.0 / r4 - 2.0, 1.0);
    let f0 = mix(vec3<f32>(0.04), albedo, metalness);
    let lobe = pow(max(dot(n, h), 0.0), shininess) * (shininess + 2.0) * 0.125;
    color += f0 * lobe * direct * INV_PI * physical;

    // light passing through the body, attenuated by thickness
    let transmitted = albedo * uniforms.ambient.rgb * INV_PI * exp(-thickness);
    color = mix(color, transmitted, transmission * 0.5);

    return vec4<f32>(color, in.color.a);
}
"#
);

/// Depth-only pass from the light's point of view.
pub const SHADOW_SHADER: &str = concat!(
    uniforms_wgsl!(),
    r#"
struct ShadowVertex {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct ShadowInstance {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
};

@vertex
fn vs_shadow(vertex: ShadowVertex, instance: ShadowInstance) -> @builtin(position) vec4<f32> {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    return uniforms.light_view_proj * model * vec4<f32>(vertex.position, 1.0);
}
"#
);

/// Unlit colored lines for the grid and axes helpers.
pub const LINE_SHADER: &str = concat!(
    uniforms_wgsl!(),
    r#"
struct LineVertex {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
};

struct LineOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_line(vertex: LineVertex) -> LineOutput {
    var out: LineOutput;
    out.clip_position = uniforms.view_proj * vec4<f32>(vertex.position, 1.0);
    out.color = vertex.color;
    return out;
}

@fragment
fn fs_line(in: LineOutput) -> @location(0) vec4<f32> {
    return in.color;
}
"#
);
