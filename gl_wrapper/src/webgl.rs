use wasm_bindgen::JsCast;
use web_sys::{
    HtmlCanvasElement, WebGlBuffer, WebGlProgram, WebGlRenderingContext as GL, WebGlShader,
};

use crate::backend::{
    AttribPointer, BlendFactor, BufferData, BufferTarget, BufferUsage, Capability, ClearMask,
    ContextError, ContextProvider, DepthFunc, Face, GlBackend, IndexType, Primitive, ShaderStage,
    SurfaceDesc,
};

/// Acquires a `webgl` context from a canvas in the current document.
#[derive(Debug, Default, Clone, Copy)]
pub struct CanvasProvider;

impl ContextProvider for CanvasProvider {
    type Backend = WebGlBackend;

    fn acquire(&self, surface: &SurfaceDesc) -> Result<Self::Backend, ContextError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or(ContextError::NoWindow)?;

        let canvas = document
            .get_element_by_id(&surface.element_id)
            .ok_or_else(|| ContextError::MissingElement(surface.element_id.clone()))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| ContextError::NotACanvas(surface.element_id.clone()))?;

        canvas.set_width(surface.width);
        canvas.set_height(surface.height);

        let gl = canvas
            .get_context("webgl")
            .ok()
            .flatten()
            .and_then(|ctx| ctx.dyn_into::<GL>().ok())
            .ok_or(ContextError::Unavailable)?;

        Ok(WebGlBackend { canvas, gl })
    }
}

pub struct WebGlBackend {
    canvas: HtmlCanvasElement,
    gl: GL,
}

impl WebGlBackend {
    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

fn capability(cap: Capability) -> u32 {
    match cap {
        Capability::DepthTest => GL::DEPTH_TEST,
        Capability::CullFace => GL::CULL_FACE,
        Capability::Blend => GL::BLEND,
    }
}

fn depth_func(func: DepthFunc) -> u32 {
    match func {
        DepthFunc::Less => GL::LESS,
        DepthFunc::LessOrEqual => GL::LEQUAL,
    }
}

fn face(face: Face) -> u32 {
    match face {
        Face::Front => GL::FRONT,
        Face::Back => GL::BACK,
    }
}

fn blend_factor(factor: BlendFactor) -> u32 {
    match factor {
        BlendFactor::SrcAlpha => GL::SRC_ALPHA,
        BlendFactor::OneMinusSrcAlpha => GL::ONE_MINUS_SRC_ALPHA,
    }
}

fn buffer_target(target: BufferTarget) -> u32 {
    match target {
        BufferTarget::Array => GL::ARRAY_BUFFER,
        BufferTarget::ElementArray => GL::ELEMENT_ARRAY_BUFFER,
    }
}

fn buffer_usage(usage: BufferUsage) -> u32 {
    match usage {
        BufferUsage::Static => GL::STATIC_DRAW,
    }
}

fn index_type(ty: IndexType) -> u32 {
    match ty {
        IndexType::UnsignedShort => GL::UNSIGNED_SHORT,
    }
}

impl GlBackend for WebGlBackend {
    type Buffer = WebGlBuffer;
    type Shader = WebGlShader;
    type Program = WebGlProgram;

    fn surface_size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        self.gl.clear_color(r, g, b, a);
    }

    fn color_mask(&self, r: bool, g: bool, b: bool, a: bool) {
        self.gl.color_mask(r, g, b, a);
    }

    fn enable(&self, cap: Capability) {
        self.gl.enable(capability(cap));
    }

    fn depth_func(&self, func: DepthFunc) {
        self.gl.depth_func(depth_func(func));
    }

    fn cull_face(&self, f: Face) {
        self.gl.cull_face(face(f));
    }

    fn blend_func(&self, src: BlendFactor, dst: BlendFactor) {
        self.gl.blend_func(blend_factor(src), blend_factor(dst));
    }

    fn clear(&self, mask: ClearMask) {
        let mut bits = 0;
        if mask.color {
            bits |= GL::COLOR_BUFFER_BIT;
        }
        if mask.depth {
            bits |= GL::DEPTH_BUFFER_BIT;
        }
        self.gl.clear(bits);
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.gl.viewport(x, y, width, height);
    }

    fn scissor(&self, x: i32, y: i32, width: i32, height: i32) {
        self.gl.scissor(x, y, width, height);
    }

    fn create_buffer(&self) -> Option<Self::Buffer> {
        self.gl.create_buffer()
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<&Self::Buffer>) {
        self.gl.bind_buffer(buffer_target(target), buffer);
    }

    fn buffer_data(&self, target: BufferTarget, data: BufferData<'_>, usage: BufferUsage) {
        let target = buffer_target(target);
        let usage = buffer_usage(usage);

        match data {
            BufferData::F32(d) => {
                let array = js_sys::Float32Array::from(d);
                self.gl
                    .buffer_data_with_array_buffer_view(target, &array, usage);
            }
            BufferData::U16(d) => {
                let array = js_sys::Uint16Array::from(d);
                self.gl
                    .buffer_data_with_array_buffer_view(target, &array, usage);
            }
        }
    }

    fn create_shader(&self, stage: ShaderStage) -> Option<Self::Shader> {
        let ty = match stage {
            ShaderStage::Vertex => GL::VERTEX_SHADER,
            ShaderStage::Fragment => GL::FRAGMENT_SHADER,
        };
        self.gl.create_shader(ty)
    }

    fn shader_source(&self, shader: &Self::Shader, source: &str) {
        self.gl.shader_source(shader, source);
    }

    fn compile_shader(&self, shader: &Self::Shader) {
        self.gl.compile_shader(shader);
    }

    fn compile_status(&self, shader: &Self::Shader) -> bool {
        self.gl
            .get_shader_parameter(shader, GL::COMPILE_STATUS)
            .as_bool()
            .unwrap_or(false)
    }

    fn shader_info_log(&self, shader: &Self::Shader) -> Option<String> {
        self.gl.get_shader_info_log(shader)
    }

    fn create_program(&self) -> Option<Self::Program> {
        self.gl.create_program()
    }

    fn attach_shader(&self, program: &Self::Program, shader: &Self::Shader) {
        self.gl.attach_shader(program, shader);
    }

    fn link_program(&self, program: &Self::Program) {
        self.gl.link_program(program);
    }

    fn link_status(&self, program: &Self::Program) -> bool {
        self.gl
            .get_program_parameter(program, GL::LINK_STATUS)
            .as_bool()
            .unwrap_or(false)
    }

    fn program_info_log(&self, program: &Self::Program) -> Option<String> {
        self.gl.get_program_info_log(program)
    }

    fn use_program(&self, program: Option<&Self::Program>) {
        self.gl.use_program(program);
    }

    fn attrib_location(&self, program: &Self::Program, name: &str) -> i32 {
        self.gl.get_attrib_location(program, name)
    }

    fn vertex_attrib_pointer(&self, index: u32, pointer: AttribPointer) {
        self.gl.vertex_attrib_pointer_with_i32(
            index,
            pointer.size,
            GL::FLOAT,
            pointer.normalized,
            pointer.stride,
            pointer.offset,
        );
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.gl.enable_vertex_attrib_array(index);
    }

    fn draw_elements(&self, mode: Primitive, count: i32, ty: IndexType, offset: i32) {
        let mode = match mode {
            Primitive::Triangles => GL::TRIANGLES,
        };
        self.gl
            .draw_elements_with_i32(mode, count, index_type(ty), offset);
    }
}
