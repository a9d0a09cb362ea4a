use thiserror::Error;

use crate::backend::{GlBackend, ShaderStage};

/// What to do when the linked program reports a failed link status.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum LinkPolicy {
    /// Log the info log and keep the unlinked program.
    #[default]
    Warn,
    /// Fail the build with [`PBError::Linking`].
    Strict,
}

pub struct ProgramBuilder<'a> {
    vert: &'a str,
    frag: &'a str,
    link_policy: LinkPolicy,
}

impl<'a> ProgramBuilder<'a> {
    pub fn new(vert_src: &'a str, frag_src: &'a str) -> Self {
        Self {
            vert: vert_src,
            frag: frag_src,
            link_policy: LinkPolicy::default(),
        }
    }

    pub fn with_link_policy(mut self, policy: LinkPolicy) -> Self {
        self.link_policy = policy;
        self
    }

    /// Compiles both stages and links them.
    ///
    /// A stage that fails to compile is logged and still attached, so the
    /// returned program may render nothing. Link failures follow the
    /// configured [`LinkPolicy`].
    pub fn build<B: GlBackend>(self, gl: &B) -> Result<Program<B>, PBError> {
        let mut diagnostics = Vec::new();

        let vert = compile_stage(gl, ShaderStage::Vertex, self.vert, &mut diagnostics)?;
        let frag = compile_stage(gl, ShaderStage::Fragment, self.frag, &mut diagnostics)?;

        let program = gl.create_program().ok_or(PBError::Creation("program"))?;
        gl.attach_shader(&program, &vert);
        gl.attach_shader(&program, &frag);
        gl.link_program(&program);

        let linked = gl.link_status(&program);
        if !linked {
            let info = gl.program_info_log(&program).unwrap_or_default();

            if self.link_policy == LinkPolicy::Strict {
                return Err(PBError::Linking(info));
            }

            let diagnostic = Diagnostic::Link(info);
            log::error!("{diagnostic}");
            diagnostics.push(diagnostic);
        }

        Ok(Program {
            handle: program,
            linked,
            diagnostics,
        })
    }
}

fn compile_stage<B: GlBackend>(
    gl: &B,
    stage: ShaderStage,
    source: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<B::Shader, PBError> {
    let shader = gl.create_shader(stage).ok_or(PBError::Creation("shader"))?;

    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    if !gl.compile_status(&shader) {
        let info = gl.shader_info_log(&shader).unwrap_or_default();
        let diagnostic = Diagnostic::Compile(stage, info);
        log::error!("{diagnostic}");
        diagnostics.push(diagnostic);
    }

    Ok(shader)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PBError {
    #[error("Could not create {0}")]
    Creation(&'static str),
    #[error("{0}")]
    Linking(String),
}

/// A non-fatal problem reported while building a program.
///
/// The `Display` form is the line written to the log.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    #[error("An error occurred compiling the shader: {1}")]
    Compile(ShaderStage, String),
    #[error("Shader program failed to link: {0}")]
    Link(String),
}

pub struct Program<B: GlBackend> {
    handle: B::Program,
    linked: bool,
    diagnostics: Vec<Diagnostic>,
}

impl<B: GlBackend> Program<B> {
    pub fn handle(&self) -> &B::Program {
        &self.handle
    }

    pub fn is_linked(&self) -> bool {
        self.linked
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Location of a named vertex input, `None` if the program lacks it.
    pub fn attrib_location(&self, gl: &B, name: &str) -> Option<u32> {
        u32::try_from(gl.attrib_location(&self.handle, name)).ok()
    }
}
