use thiserror::Error;

/// Subset of the WebGL 1 API used for drawing.
///
/// Handles are associated types so the same drawing code runs against the
/// browser context and against [`RecordingBackend`](crate::recording::RecordingBackend).
pub trait GlBackend {
    type Buffer;
    type Shader;
    type Program;

    /// Current size of the drawing surface in pixels.
    fn surface_size(&self) -> (u32, u32);

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32);
    fn color_mask(&self, r: bool, g: bool, b: bool, a: bool);
    fn enable(&self, cap: Capability);
    fn depth_func(&self, func: DepthFunc);
    fn cull_face(&self, face: Face);
    fn blend_func(&self, src: BlendFactor, dst: BlendFactor);
    fn clear(&self, mask: ClearMask);
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    fn scissor(&self, x: i32, y: i32, width: i32, height: i32);

    fn create_buffer(&self) -> Option<Self::Buffer>;
    fn bind_buffer(&self, target: BufferTarget, buffer: Option<&Self::Buffer>);
    fn buffer_data(&self, target: BufferTarget, data: BufferData<'_>, usage: BufferUsage);

    fn create_shader(&self, stage: ShaderStage) -> Option<Self::Shader>;
    fn shader_source(&self, shader: &Self::Shader, source: &str);
    fn compile_shader(&self, shader: &Self::Shader);
    fn compile_status(&self, shader: &Self::Shader) -> bool;
    fn shader_info_log(&self, shader: &Self::Shader) -> Option<String>;

    fn create_program(&self) -> Option<Self::Program>;
    fn attach_shader(&self, program: &Self::Program, shader: &Self::Shader);
    fn link_program(&self, program: &Self::Program);
    fn link_status(&self, program: &Self::Program) -> bool;
    fn program_info_log(&self, program: &Self::Program) -> Option<String>;
    fn use_program(&self, program: Option<&Self::Program>);

    /// Returns -1 when the program has no active attribute with that name.
    fn attrib_location(&self, program: &Self::Program, name: &str) -> i32;
    fn vertex_attrib_pointer(&self, index: u32, pointer: AttribPointer);
    fn enable_vertex_attrib_array(&self, index: u32);

    fn draw_elements(&self, mode: Primitive, count: i32, index_type: IndexType, offset: i32);
}

/// Something that can hand out a [`GlBackend`] bound to a surface.
pub trait ContextProvider {
    type Backend: GlBackend;

    fn acquire(&self, surface: &SurfaceDesc) -> Result<Self::Backend, ContextError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceDesc {
    pub element_id: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("No browser window available")]
    NoWindow,
    #[error("No element with id {0:?}")]
    MissingElement(String),
    #[error("Element {0:?} is not a canvas")]
    NotACanvas(String),
    #[error("WebGL failed to initialize")]
    Unavailable,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Capability {
    DepthTest,
    CullFace,
    Blend,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DepthFunc {
    Less,
    LessOrEqual,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Face {
    Front,
    Back,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BlendFactor {
    SrcAlpha,
    OneMinusSrcAlpha,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ClearMask {
    pub color: bool,
    pub depth: bool,
}

impl ClearMask {
    pub const COLOR_DEPTH: ClearMask = ClearMask {
        color: true,
        depth: true,
    };
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BufferTarget {
    Array,
    ElementArray,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BufferUsage {
    Static,
}

/// Typed view over data handed to `bufferData`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum BufferData<'a> {
    F32(&'a [f32]),
    U16(&'a [u16]),
}

impl<'a> BufferData<'a> {
    /// Index data goes to the element array target, everything else to the array target.
    pub fn target(&self) -> BufferTarget {
        match self {
            BufferData::U16(_) => BufferTarget::ElementArray,
            BufferData::F32(_) => BufferTarget::Array,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            BufferData::F32(d) => d.len(),
            BufferData::U16(d) => d.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AttribPointer {
    pub size: i32,
    pub normalized: bool,
    pub stride: i32,
    pub offset: i32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Primitive {
    Triangles,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum IndexType {
    UnsignedShort,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_target_follows_element_type() {
        assert_eq!(BufferData::F32(&[0.0; 9]).target(), BufferTarget::Array);
        assert_eq!(BufferData::U16(&[0, 1, 2]).target(), BufferTarget::ElementArray);
    }

    #[test]
    fn element_count() {
        assert_eq!(BufferData::F32(&[0.0; 9]).len(), 9);
        assert_eq!(BufferData::U16(&[0, 1, 2]).len(), 3);
        assert!(BufferData::U16(&[]).is_empty());
    }
}
