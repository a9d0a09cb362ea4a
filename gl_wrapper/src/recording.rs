//! In-memory [`GlBackend`] that records every call instead of drawing.
//!
//! Compilation succeeds when the stage is not listed in
//! [`RecordingOptions::failing_stages`] and the source declares `void main`.
//! Attribute locations are assigned in declaration order from the
//! `attribute` lines of the vertex source.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::backend::{
    AttribPointer, BlendFactor, BufferData, BufferTarget, BufferUsage, Capability, ClearMask,
    ContextError, ContextProvider, DepthFunc, Face, GlBackend, IndexType, Primitive, ShaderStage,
    SurfaceDesc,
};

#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    ClearColor([f32; 4]),
    ColorMask([bool; 4]),
    Enable(Capability),
    DepthFunc(DepthFunc),
    CullFace(Face),
    BlendFunc(BlendFactor, BlendFactor),
    Clear(ClearMask),
    Viewport(i32, i32, i32, i32),
    Scissor(i32, i32, i32, i32),
    CreateBuffer(u32),
    BindBuffer(BufferTarget, Option<u32>),
    BufferData(BufferTarget, OwnedData, BufferUsage),
    CreateShader(u32, ShaderStage),
    ShaderSource(u32),
    CompileShader(u32),
    CreateProgram(u32),
    AttachShader(u32, u32),
    LinkProgram(u32),
    UseProgram(Option<u32>),
    VertexAttribPointer(u32, AttribPointer),
    EnableVertexAttribArray(u32),
    DrawElements(Primitive, i32, IndexType, i32),
}

impl GlCall {
    pub fn is_resource_call(&self) -> bool {
        matches!(
            self,
            GlCall::CreateBuffer(_)
                | GlCall::BufferData(..)
                | GlCall::CreateShader(..)
                | GlCall::ShaderSource(_)
                | GlCall::CompileShader(_)
                | GlCall::CreateProgram(_)
                | GlCall::AttachShader(..)
                | GlCall::LinkProgram(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OwnedData {
    F32(Vec<f32>),
    U16(Vec<u16>),
}

impl From<BufferData<'_>> for OwnedData {
    fn from(data: BufferData<'_>) -> Self {
        match data {
            BufferData::F32(d) => OwnedData::F32(d.to_vec()),
            BufferData::U16(d) => OwnedData::U16(d.to_vec()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordingOptions {
    pub deny_context: bool,
    pub failing_stages: Vec<ShaderStage>,
    pub fail_link: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RecBuffer(pub u32);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RecShader(pub u32);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RecProgram(pub u32);

struct ShaderRecord {
    stage: ShaderStage,
    source: String,
    compiled: bool,
}

#[derive(Default)]
struct ProgramRecord {
    shaders: Vec<u32>,
    linked: bool,
    attributes: Vec<String>,
}

#[derive(Default)]
struct Recorder {
    options: RecordingOptions,
    calls: RefCell<Vec<GlCall>>,
    next_id: Cell<u32>,
    size: Cell<(u32, u32)>,
    shaders: RefCell<HashMap<u32, ShaderRecord>>,
    programs: RefCell<HashMap<u32, ProgramRecord>>,
}

impl Recorder {
    fn push(&self, call: GlCall) {
        self.calls.borrow_mut().push(call);
    }

    fn next_id(&self) -> u32 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }
}

/// Hands out [`RecordingBackend`]s that share one call log.
#[derive(Clone, Default)]
pub struct RecordingProvider {
    recorder: Rc<Recorder>,
}

impl RecordingProvider {
    pub fn new(options: RecordingOptions) -> Self {
        Self {
            recorder: Rc::new(Recorder {
                options,
                ..Default::default()
            }),
        }
    }

    pub fn calls(&self) -> Vec<GlCall> {
        self.recorder.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.recorder.calls.borrow_mut().clear();
    }

    /// Changes the size reported by the surface, as a host-driven resize would.
    pub fn set_surface_size(&self, width: u32, height: u32) {
        self.recorder.size.set((width, height));
    }
}

impl ContextProvider for RecordingProvider {
    type Backend = RecordingBackend;

    fn acquire(&self, surface: &SurfaceDesc) -> Result<Self::Backend, ContextError> {
        if self.recorder.options.deny_context {
            return Err(ContextError::Unavailable);
        }

        self.recorder.size.set((surface.width, surface.height));

        Ok(RecordingBackend {
            recorder: Rc::clone(&self.recorder),
        })
    }
}

pub struct RecordingBackend {
    recorder: Rc<Recorder>,
}

impl GlBackend for RecordingBackend {
    type Buffer = RecBuffer;
    type Shader = RecShader;
    type Program = RecProgram;

    fn surface_size(&self) -> (u32, u32) {
        self.recorder.size.get()
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        self.recorder.push(GlCall::ClearColor([r, g, b, a]));
    }

    fn color_mask(&self, r: bool, g: bool, b: bool, a: bool) {
        self.recorder.push(GlCall::ColorMask([r, g, b, a]));
    }

    fn enable(&self, cap: Capability) {
        self.recorder.push(GlCall::Enable(cap));
    }

    fn depth_func(&self, func: DepthFunc) {
        self.recorder.push(GlCall::DepthFunc(func));
    }

    fn cull_face(&self, face: Face) {
        self.recorder.push(GlCall::CullFace(face));
    }

    fn blend_func(&self, src: BlendFactor, dst: BlendFactor) {
        self.recorder.push(GlCall::BlendFunc(src, dst));
    }

    fn clear(&self, mask: ClearMask) {
        self.recorder.push(GlCall::Clear(mask));
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.recorder.push(GlCall::Viewport(x, y, width, height));
    }

    fn scissor(&self, x: i32, y: i32, width: i32, height: i32) {
        self.recorder.push(GlCall::Scissor(x, y, width, height));
    }

    fn create_buffer(&self) -> Option<Self::Buffer> {
        let id = self.recorder.next_id();
        self.recorder.push(GlCall::CreateBuffer(id));
        Some(RecBuffer(id))
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<&Self::Buffer>) {
        self.recorder
            .push(GlCall::BindBuffer(target, buffer.map(|b| b.0)));
    }

    fn buffer_data(&self, target: BufferTarget, data: BufferData<'_>, usage: BufferUsage) {
        self.recorder
            .push(GlCall::BufferData(target, data.into(), usage));
    }

    fn create_shader(&self, stage: ShaderStage) -> Option<Self::Shader> {
        let id = self.recorder.next_id();
        self.recorder.shaders.borrow_mut().insert(
            id,
            ShaderRecord {
                stage,
                source: String::new(),
                compiled: false,
            },
        );
        self.recorder.push(GlCall::CreateShader(id, stage));
        Some(RecShader(id))
    }

    fn shader_source(&self, shader: &Self::Shader, source: &str) {
        if let Some(record) = self.recorder.shaders.borrow_mut().get_mut(&shader.0) {
            record.source = source.to_owned();
        }
        self.recorder.push(GlCall::ShaderSource(shader.0));
    }

    fn compile_shader(&self, shader: &Self::Shader) {
        if let Some(record) = self.recorder.shaders.borrow_mut().get_mut(&shader.0) {
            record.compiled = !self.recorder.options.failing_stages.contains(&record.stage)
                && record.source.contains("void main");
        }
        self.recorder.push(GlCall::CompileShader(shader.0));
    }

    fn compile_status(&self, shader: &Self::Shader) -> bool {
        self.recorder
            .shaders
            .borrow()
            .get(&shader.0)
            .map(|s| s.compiled)
            .unwrap_or(false)
    }

    fn shader_info_log(&self, shader: &Self::Shader) -> Option<String> {
        let shaders = self.recorder.shaders.borrow();
        let record = shaders.get(&shader.0)?;

        if record.compiled {
            Some(String::new())
        } else {
            Some(format!("ERROR: 0:1: {:?} stage rejected", record.stage))
        }
    }

    fn create_program(&self) -> Option<Self::Program> {
        let id = self.recorder.next_id();
        self.recorder
            .programs
            .borrow_mut()
            .insert(id, ProgramRecord::default());
        self.recorder.push(GlCall::CreateProgram(id));
        Some(RecProgram(id))
    }

    fn attach_shader(&self, program: &Self::Program, shader: &Self::Shader) {
        if let Some(record) = self.recorder.programs.borrow_mut().get_mut(&program.0) {
            record.shaders.push(shader.0);
        }
        self.recorder.push(GlCall::AttachShader(program.0, shader.0));
    }

    fn link_program(&self, program: &Self::Program) {
        let shaders = self.recorder.shaders.borrow();
        if let Some(record) = self.recorder.programs.borrow_mut().get_mut(&program.0) {
            let attached: Vec<&ShaderRecord> =
                record.shaders.iter().filter_map(|id| shaders.get(id)).collect();

            let has_stage = |stage: ShaderStage| attached.iter().any(|s| s.stage == stage);

            record.linked = !self.recorder.options.fail_link
                && has_stage(ShaderStage::Vertex)
                && has_stage(ShaderStage::Fragment)
                && attached.iter().all(|s| s.compiled);

            record.attributes = attached
                .iter()
                .filter(|s| s.stage == ShaderStage::Vertex)
                .flat_map(|s| declared_attributes(&s.source))
                .collect();
        }
        self.recorder.push(GlCall::LinkProgram(program.0));
    }

    fn link_status(&self, program: &Self::Program) -> bool {
        self.recorder
            .programs
            .borrow()
            .get(&program.0)
            .map(|p| p.linked)
            .unwrap_or(false)
    }

    fn program_info_log(&self, program: &Self::Program) -> Option<String> {
        let programs = self.recorder.programs.borrow();
        let record = programs.get(&program.0)?;

        if record.linked {
            Some(String::new())
        } else {
            Some("ERROR: program not linked".to_owned())
        }
    }

    fn use_program(&self, program: Option<&Self::Program>) {
        self.recorder.push(GlCall::UseProgram(program.map(|p| p.0)));
    }

    fn attrib_location(&self, program: &Self::Program, name: &str) -> i32 {
        let programs = self.recorder.programs.borrow();

        match programs.get(&program.0) {
            Some(record) if record.linked => record
                .attributes
                .iter()
                .position(|a| a == name)
                .map(|p| p as i32)
                .unwrap_or(-1),
            _ => -1,
        }
    }

    fn vertex_attrib_pointer(&self, index: u32, pointer: AttribPointer) {
        self.recorder
            .push(GlCall::VertexAttribPointer(index, pointer));
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.recorder.push(GlCall::EnableVertexAttribArray(index));
    }

    fn draw_elements(&self, mode: Primitive, count: i32, index_type: IndexType, offset: i32) {
        self.recorder
            .push(GlCall::DrawElements(mode, count, index_type, offset));
    }
}

fn declared_attributes(source: &str) -> Vec<String> {
    source
        .lines()
        .filter_map(|line| {
            let line = line.trim().strip_prefix("attribute ")?;
            let name = line.split_whitespace().nth(1)?;
            Some(name.trim_end_matches(';').to_owned())
        })
        .collect()
}
