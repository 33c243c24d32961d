//! WGSL sources for the three 2D pipelines.
//!
//! All pipelines share one uniform layout: a field-to-clip transform, a
//! layer color (rgb plus a layer-wide opacity multiplier), and the stroke
//! width for lines. Geometry is instanced: each instance expands to a
//! six-vertex quad in the vertex stage.

pub const POINT_SHADER: &str = r#"
struct Uniforms {
    transform: mat4x4<f32>,
    color: vec4<f32>,
    line_width: f32,
    _pad0: f32,
    _pad1: f32,
    _pad2: f32,
};

@group(0) @binding(0) var<uniform> u: Uniforms;

struct PointIn {
    @builtin(vertex_index) vi: u32,
    @location(0) pos: vec2<f32>,
    @location(1) size: f32,
    @location(2) alpha: f32,
};

struct VsOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) alpha: f32,
};

@vertex
fn vs_main(in: PointIn) -> VsOut {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-0.5, -0.5), vec2<f32>(0.5, -0.5), vec2<f32>(0.5, 0.5),
        vec2<f32>(-0.5, -0.5), vec2<f32>(0.5, 0.5), vec2<f32>(-0.5, 0.5),
    );
    let world = in.pos + corners[in.vi] * in.size;
    var out: VsOut;
    out.clip = u.transform * vec4<f32>(world, 0.0, 1.0);
    out.alpha = in.alpha * u.color.a;
    return out;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    return vec4<f32>(u.color.rgb, in.alpha);
}
"#;

pub const LINE_SHADER: &str = r#"
struct Uniforms {
    transform: mat4x4<f32>,
    color: vec4<f32>,
    line_width: f32,
    _pad0: f32,
    _pad1: f32,
    _pad2: f32,
};

@group(0) @binding(0) var<uniform> u: Uniforms;

struct LineIn {
    @builtin(vertex_index) vi: u32,
    @location(0) a: vec2<f32>,
    @location(1) b: vec2<f32>,
    @location(2) alpha: f32,
};

struct VsOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) alpha: f32,
};

@vertex
fn vs_main(in: LineIn) -> VsOut {
    // Expand the segment into a quad of the configured stroke width.
    var ends = array<f32, 6>(0.0, 1.0, 1.0, 0.0, 1.0, 0.0);
    var sides = array<f32, 6>(-1.0, -1.0, 1.0, -1.0, 1.0, 1.0);
    let dir = normalize(in.b - in.a);
    let normal = vec2<f32>(-dir.y, dir.x) * u.line_width * 0.5;
    let p = mix(in.a, in.b, ends[in.vi]) + normal * sides[in.vi];
    var out: VsOut;
    out.clip = u.transform * vec4<f32>(p, 0.0, 1.0);
    out.alpha = in.alpha * u.color.a;
    return out;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    return vec4<f32>(u.color.rgb, in.alpha);
}
"#;

pub const STAR_SHADER: &str = r#"
struct Uniforms {
    transform: mat4x4<f32>,
    color: vec4<f32>,
    line_width: f32,
    _pad0: f32,
    _pad1: f32,
    _pad2: f32,
};

@group(0) @binding(0) var<uniform> u: Uniforms;
@group(1) @binding(0) var star_tex: texture_2d<f32>;
@group(1) @binding(1) var star_samp: sampler;

struct StarIn {
    @builtin(vertex_index) vi: u32,
    @location(0) pos: vec2<f32>,
    @location(1) size: f32,
    @location(2) alpha: f32,
};

struct VsOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) alpha: f32,
};

@vertex
fn vs_main(in: StarIn) -> VsOut {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-0.5, -0.5), vec2<f32>(0.5, -0.5), vec2<f32>(0.5, 0.5),
        vec2<f32>(-0.5, -0.5), vec2<f32>(0.5, 0.5), vec2<f32>(-0.5, 0.5),
    );
    let corner = corners[in.vi];
    // Sprite quads are oversized relative to the star so the glow halo
    // has room to fall off.
    let world = in.pos + corner * in.size * 4.0;
    var out: VsOut;
    out.clip = u.transform * vec4<f32>(world, 0.0, 1.0);
    out.uv = corner + vec2<f32>(0.5, 0.5);
    out.alpha = in.alpha * u.color.a;
    return out;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    let glow = textureSample(star_tex, star_samp, in.uv).a;
    return vec4<f32>(u.color.rgb, in.alpha * glow);
}
"#;
