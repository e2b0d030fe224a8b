//! WGSL sources shared by the backends.

/// Bindings every path tracing kernel sees.
///
/// Prepend this to the kernel body with [`kernel_source`]. `Sphere` is laid
/// out with packed vectors so one element is exactly 56 bytes, matching
/// [`Sphere`](crate::scene::Sphere) on the CPU side.
pub const KERNEL_INTERFACE_WGSL: &str = r#"
struct KernelUniforms {
    camera_to_world: mat4x4<f32>,
    inverse_projection: mat4x4<f32>,
    directional_light: vec4<f32>,
    pixel_offset: vec2<f32>,
    seed: f32,
    sphere_count: u32,
}

struct PackedVec3 {
    x: f32,
    y: f32,
    z: f32,
}

struct Sphere {
    position: PackedVec3,
    radius: f32,
    albedo: PackedVec3,
    specular: PackedVec3,
    smoothness: f32,
    emission: PackedVec3,
}

@group(0) @binding(0) var<uniform> uniforms: KernelUniforms;
@group(0) @binding(1) var<storage, read> spheres: array<Sphere>;
@group(0) @binding(2) var skybox_texture: texture_2d<f32>;
@group(0) @binding(3) var skybox_sampler: sampler;
@group(0) @binding(4) var output_image: texture_storage_2d<rgba32float, write>;

fn unpack_vec3(v: PackedVec3) -> vec3<f32> {
    return vec3<f32>(v.x, v.y, v.z);
}
"#;

/// Running average of the working image into the converged image.
///
/// With a weight of zero the source is copied as is, otherwise
/// `destination = (destination * n + source) / (n + 1)`.
pub const ACCUMULATE_SHADER: &str = r#"
struct AccumulateParams {
    sample_weight: f32,
    _pad0: f32,
    _pad1: f32,
    _pad2: f32,
}

@group(0) @binding(0) var<uniform> params: AccumulateParams;
@group(0) @binding(1) var source_image: texture_2d<f32>;
@group(0) @binding(2) var destination_image: texture_storage_2d<rgba32float, read_write>;

@compute @workgroup_size(8, 8, 1)
fn cs_main(@builtin(global_invocation_id) id: vec3<u32>) {
    let size = textureDimensions(destination_image);
    if (id.x >= size.x || id.y >= size.y) {
        return;
    }

    let coord = vec2<i32>(id.xy);
    let current = textureLoad(source_image, coord, 0);
    let n = params.sample_weight;

    var result = current;
    if (n > 0.0) {
        let previous = textureLoad(destination_image, coord);
        result = (previous * n + current) / (n + 1.0);
    }
    textureStore(destination_image, coord, result);
}
"#;

/// Fullscreen triangle that copies the converged image to the surface.
pub const PRESENT_SHADER: &str = r#"
@group(0) @binding(0) var converged_image: texture_2d<f32>;

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
}

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> VertexOutput {
    var output: VertexOutput;
    let x = f32((vertex_index << 1u) & 2u);
    let y = f32(vertex_index & 2u);
    output.position = vec4<f32>(x * 2.0 - 1.0, y * 2.0 - 1.0, 0.0, 1.0);
    return output;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    let size = vec2<i32>(textureDimensions(converged_image));
    let coord = clamp(vec2<i32>(input.position.xy), vec2<i32>(0), size - vec2<i32>(1));
    return vec4<f32>(textureLoad(converged_image, coord, 0).rgb, 1.0);
}
"#;

/// Build a complete kernel module from a body that uses the shared bindings.
pub fn kernel_source(body: &str) -> String {
    format!("{}\n{}", KERNEL_INTERFACE_WGSL, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(source: &str) {
        let module = naga::front::wgsl::parse_str(source).expect("WGSL should parse");
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .expect("WGSL should validate");
    }

    #[test]
    fn test_accumulate_shader_is_valid() {
        validate(ACCUMULATE_SHADER);
    }

    #[test]
    fn test_present_shader_is_valid() {
        validate(PRESENT_SHADER);
    }

    #[test]
    fn test_kernel_interface_accepts_body() {
        let source = kernel_source(
            r#"
@compute @workgroup_size(8, 8, 1)
fn main(@builtin(global_invocation_id) id: vec3<u32>) {
    var color = vec3<f32>(0.0);
    if (uniforms.sphere_count > 0u) {
        color = unpack_vec3(spheres[0].emission);
    }
    let sky = textureSampleLevel(skybox_texture, skybox_sampler, vec2<f32>(0.5), 0.0);
    textureStore(output_image, vec2<i32>(id.xy), vec4<f32>(color + sky.rgb, 1.0));
}
"#,
        );
        validate(&source);
    }
}
