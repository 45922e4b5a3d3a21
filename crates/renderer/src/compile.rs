use std::borrow::Cow;

use wgpu::naga::ShaderStage;

/// Compiles the static full-screen triangle vertex shader.
pub(crate) fn compile_vertex_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("fullscreen triangle vertex"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(VERTEX_SHADER_GLSL),
            stage: ShaderStage::Vertex,
            defines: &[],
        },
    })
}

/// Compiles the field fragment shader.
pub(crate) fn compile_fragment_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("wellfield fragment"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(FRAGMENT_SHADER_GLSL),
            stage: ShaderStage::Fragment,
            defines: &[],
        },
    })
}

/// Per-pixel field evaluation and colorizing.
///
/// The uniform block layout must match [`FieldUniforms`](crate::gpu::uniforms::FieldUniforms).
/// Squares are written as products because GLSL leaves `pow` undefined for
/// negative bases.
pub(crate) const FRAGMENT_SHADER_GLSL: &str = r"#version 450
layout(location = 0) in vec2 v_position;
layout(location = 0) out vec4 outColor;

layout(std140, set = 0, binding = 0) uniform FieldBlock {
    vec4 timing;
    vec4 scale;
    vec4 range;
    vec4 knees;
    vec4 low;
    vec4 mid;
    vec4 high;
} ubo;

float wellfield_well(float dx, float dy) {
    return (dx * dx + dy * dy) / 1.5;
}

float wellfield_height(float x, float y, float t) {
    float oscillation = cos(10.0 * t);
    float k = oscillation * oscillation / 21.0;
    return (wellfield_well(x - 1.5, y) * wellfield_well(x + 1.5, y) + k) / 2.0;
}

vec4 wellfield_colorize(float v) {
    vec3 rgb;
    if (v < ubo.knees.y) {
        float c = (v - ubo.knees.x) / (ubo.knees.y - ubo.knees.x);
        rgb = mix(ubo.low.rgb, ubo.mid.rgb, c);
    } else {
        float c = (v - ubo.knees.y) / (ubo.knees.z - ubo.knees.y);
        rgb = mix(ubo.mid.rgb, ubo.high.rgb, c);
    }
    return vec4(rgb, 1.0);
}

void main() {
    float x = ubo.scale.x * v_position.x;
    float y = ubo.scale.y * v_position.y;
    float t = ubo.scale.z * ubo.timing.x;
    float z = wellfield_height(x, y, t);
    float v = (z + ubo.range.x) / ubo.range.y;
    outColor = wellfield_colorize(v) * ubo.scale.w;
}
";

/// Minimal full-screen triangle vertex shader forwarding clip-space position.
pub(crate) const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) out vec2 v_position;

const vec2 positions[3] = vec2[3](
    vec2(-1.0, -3.0),
    vec2(3.0, 1.0),
    vec2(-1.0, 1.0)
);

void main() {
    uint vertex_index = uint(gl_VertexIndex);
    vec2 pos = positions[vertex_index];
    v_position = pos;
    gl_Position = vec4(pos, 0.0, 1.0);
}
";
