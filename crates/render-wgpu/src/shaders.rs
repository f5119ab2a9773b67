/// WGSL shader for every pass: the ripple surface (instanced points or a
/// mesh), the starfield, and the spinner wireframe. All passes are unlit
/// and take their color straight from the vertex data.
pub const SCENE_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    surface_model: mat4x4<f32>,
    spin_model: mat4x4<f32>,
    // x: world-space point size; yzw unused.
    params: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct ColoredVertex {
    @location(0) position: vec3<f32>,
    @location(1) color: vec3<f32>,
};

struct PointInput {
    @location(0) corner: vec3<f32>,
    @location(1) cell: vec3<f32>,
    @location(2) color: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec3<f32>,
};

@vertex
fn vs_points(input: PointInput) -> VertexOutput {
    let center = uniforms.surface_model * vec4<f32>(input.cell, 1.0);
    let world = center + vec4<f32>(input.corner * uniforms.params.x, 0.0);

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * world;
    out.color = input.color;
    return out;
}

@vertex
fn vs_surface(vertex: ColoredVertex) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * uniforms.surface_model * vec4<f32>(vertex.position, 1.0);
    out.color = vertex.color;
    return out;
}

@vertex
fn vs_stars(vertex: ColoredVertex) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * vec4<f32>(vertex.position, 1.0);
    out.color = vertex.color;
    return out;
}

@vertex
fn vs_spin(vertex: ColoredVertex) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * uniforms.spin_model * vec4<f32>(vertex.position, 1.0);
    out.color = vertex.color;
    return out;
}

@fragment
fn fs_color(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(in.color, 1.0);
}
"#;
