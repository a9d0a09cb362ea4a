use thiserror::Error;

use gl_wrapper::geometry::{Buffer, BufferBuilder, GBError, VertexAttribute};
use gl_wrapper::program::{PBError, Program, ProgramBuilder};
use gl_wrapper::renderer::{FixedState, GlRenderer};
use gl_wrapper::{ContextError, ContextProvider, GlBackend};

use crate::config::{ConfigError, SessionConfig};
use crate::scene::{Scene, COLOR_ATTRIBUTE, POSITION_ATTRIBUTE};

/// Owns the context and every GPU resource needed to draw a [`Scene`].
///
/// Resources are created once in [`RenderSession::new`] and only re-bound
/// afterwards, so every call to [`RenderSession::render_frame`] issues the
/// same commands.
pub struct RenderSession<B: GlBackend> {
    gl: B,
    state: FixedState,
    positions: Buffer<B>,
    colors: Buffer<B>,
    indices: Buffer<B>,
    program: Program<B>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FrameInfo {
    pub width: u32,
    pub height: u32,
    pub bound_attributes: u32,
    pub draw_calls: u32,
}

impl<B: GlBackend> RenderSession<B> {
    pub fn new<P>(provider: &P, config: &SessionConfig, scene: &Scene) -> Result<Self, SessionError>
    where
        P: ContextProvider<Backend = B>,
    {
        config.validate()?;

        let surface = config.surface();
        let gl = provider.acquire(&surface)?;
        log::info!(
            "Acquired rendering context on #{} ({}x{})",
            surface.element_id,
            surface.width,
            surface.height
        );

        let state = FixedState::default();
        GlRenderer::new(&gl).apply_state(&state);

        let positions = BufferBuilder::vertices(&scene.positions, VertexAttribute::Vec3).build(&gl)?;
        let colors = BufferBuilder::vertices(&scene.colors, VertexAttribute::Vec3).build(&gl)?;
        let indices = BufferBuilder::indices(&scene.indices).build(&gl)?;

        if positions.elements() != colors.elements() {
            log::warn!(
                "Position and color buffers differ in length ({} vs {} vertices)",
                positions.elements(),
                colors.elements()
            );
        }

        let program = ProgramBuilder::new(&scene.vertex_shader, &scene.fragment_shader)
            .with_link_policy(config.link_policy.into())
            .build(&gl)?;

        if program.is_linked() {
            log::debug!("Shader program linked");
        }

        Ok(Self {
            gl,
            state,
            positions,
            colors,
            indices,
            program,
        })
    }

    /// Draws one frame: clear, bind program and buffers, one indexed draw.
    pub fn render_frame(&self) -> FrameInfo {
        let renderer = GlRenderer::new(&self.gl);

        let (width, height) = renderer.begin_frame(&self.program);

        let mut bound_attributes = 0;
        for (buffer, name) in [
            (&self.positions, POSITION_ATTRIBUTE),
            (&self.colors, COLOR_ATTRIBUTE),
        ] {
            if renderer.bind_attribute(&self.program, buffer, name) {
                bound_attributes += 1;
            }
        }

        renderer.draw_indexed(&self.indices);

        FrameInfo {
            width,
            height,
            bound_attributes,
            draw_calls: 1,
        }
    }

    pub fn backend(&self) -> &B {
        &self.gl
    }

    pub fn program(&self) -> &Program<B> {
        &self.program
    }

    pub fn state(&self) -> &FixedState {
        &self.state
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Could not acquire rendering context: {0}")]
    Context(#[from] ContextError),
    #[error("Could not upload geometry: {0}")]
    Geometry(#[from] GBError),
    #[error("Could not build shader program: {0}")]
    Program(#[from] PBError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LinkPolicyArg;
    use gl_wrapper::backend::{
        AttribPointer, BufferTarget, BufferUsage, ClearMask, IndexType, Primitive, ShaderStage,
    };
    use gl_wrapper::program::Diagnostic;
    use gl_wrapper::recording::{GlCall, OwnedData, RecordingOptions, RecordingProvider};

    fn session(provider: &RecordingProvider) -> RenderSession<gl_wrapper::recording::RecordingBackend> {
        RenderSession::new(provider, &SessionConfig::default(), &Scene::triangle()).unwrap()
    }

    #[test]
    fn uploads_fixed_geometry() {
        let provider = RecordingProvider::default();
        let _session = session(&provider);

        let uploads: Vec<_> = provider
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                GlCall::BufferData(target, data, usage) => Some((target, data, usage)),
                _ => None,
            })
            .collect();

        assert_eq!(
            uploads,
            vec![
                (
                    BufferTarget::Array,
                    OwnedData::F32(vec![1.0, -1.0, 0.0, -1.0, -1.0, 0.0, 0.0, 1.0, 0.0]),
                    BufferUsage::Static
                ),
                (
                    BufferTarget::Array,
                    OwnedData::F32(vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]),
                    BufferUsage::Static
                ),
                (
                    BufferTarget::ElementArray,
                    OwnedData::U16(vec![0, 1, 2]),
                    BufferUsage::Static
                ),
            ]
        );
    }

    #[test]
    fn frame_binds_both_inputs_and_draws_once() {
        let provider = RecordingProvider::default();
        let session = session(&provider);
        provider.clear_calls();

        let info = session.render_frame();
        let calls = provider.calls();

        assert_eq!(
            info,
            FrameInfo {
                width: 640,
                height: 640,
                bound_attributes: 2,
                draw_calls: 1,
            }
        );

        assert_eq!(calls[0], GlCall::Clear(ClearMask::COLOR_DEPTH));
        assert!(matches!(calls[1], GlCall::UseProgram(Some(_))));
        assert_eq!(calls[2], GlCall::Viewport(0, 0, 640, 640));
        assert_eq!(calls[3], GlCall::Scissor(0, 0, 640, 640));

        let pointer = AttribPointer {
            size: 3,
            normalized: false,
            stride: 12,
            offset: 0,
        };
        assert_eq!(calls[5], GlCall::VertexAttribPointer(0, pointer));
        assert_eq!(calls[6], GlCall::EnableVertexAttribArray(0));
        assert_eq!(calls[8], GlCall::VertexAttribPointer(1, pointer));
        assert_eq!(calls[9], GlCall::EnableVertexAttribArray(1));

        let draws: Vec<_> = calls
            .iter()
            .filter(|c| matches!(c, GlCall::DrawElements(..)))
            .collect();
        assert_eq!(
            draws,
            vec![&GlCall::DrawElements(
                Primitive::Triangles,
                3,
                IndexType::UnsignedShort,
                0
            )]
        );
    }

    #[test]
    fn frames_are_identical() {
        let provider = RecordingProvider::default();
        let session = session(&provider);

        provider.clear_calls();
        session.render_frame();
        let first = provider.calls();

        for _ in 0..5 {
            provider.clear_calls();
            session.render_frame();
            assert_eq!(provider.calls(), first);
        }
    }

    #[test]
    fn viewport_follows_current_surface_size() {
        let provider = RecordingProvider::default();
        let session = session(&provider);

        provider.set_surface_size(300, 200);
        provider.clear_calls();
        let info = session.render_frame();

        assert_eq!((info.width, info.height), (300, 200));
        assert!(provider.calls().contains(&GlCall::Viewport(0, 0, 300, 200)));
        assert!(provider.calls().contains(&GlCall::Scissor(0, 0, 300, 200)));
    }

    #[test]
    fn denied_context_stops_before_any_resource() {
        let provider = RecordingProvider::new(RecordingOptions {
            deny_context: true,
            ..Default::default()
        });

        let res = RenderSession::new(&provider, &SessionConfig::default(), &Scene::triangle());

        assert!(matches!(
            res,
            Err(SessionError::Context(ContextError::Unavailable))
        ));
        assert!(provider.calls().is_empty());
    }

    #[test]
    fn compile_failure_still_draws() {
        let provider = RecordingProvider::new(RecordingOptions {
            failing_stages: vec![ShaderStage::Fragment],
            ..Default::default()
        });
        let session = session(&provider);

        assert!(!session.program().is_linked());
        assert!(matches!(
            session.program().diagnostics()[0],
            Diagnostic::Compile(ShaderStage::Fragment, _)
        ));

        provider.clear_calls();
        let info = session.render_frame();

        assert_eq!(info.draw_calls, 1);
        assert_eq!(info.bound_attributes, 0);
        assert!(provider
            .calls()
            .iter()
            .any(|c| matches!(c, GlCall::DrawElements(..))));
    }

    #[test]
    fn invalid_source_still_builds_session() {
        let provider = RecordingProvider::default();
        let scene = Scene::triangle().with_shaders("garbage", crate::scene::FRAGMENT_SHADER);

        let session = RenderSession::new(&provider, &SessionConfig::default(), &scene).unwrap();

        assert!(matches!(
            session.program().diagnostics()[0],
            Diagnostic::Compile(ShaderStage::Vertex, _)
        ));
    }

    #[test]
    fn strict_link_policy_fails_setup() {
        let provider = RecordingProvider::new(RecordingOptions {
            fail_link: true,
            ..Default::default()
        });
        let config = SessionConfig {
            link_policy: LinkPolicyArg::Strict,
            ..Default::default()
        };

        let res = RenderSession::new(&provider, &config, &Scene::triangle());

        assert!(matches!(
            res,
            Err(SessionError::Program(PBError::Linking(_)))
        ));
    }

    #[test]
    fn setup_order() {
        let provider = RecordingProvider::default();
        let _session = session(&provider);
        let calls = provider.calls();

        let first_buffer = calls
            .iter()
            .position(|c| matches!(c, GlCall::CreateBuffer(_)))
            .unwrap();
        let first_shader = calls
            .iter()
            .position(|c| matches!(c, GlCall::CreateShader(..)))
            .unwrap();
        let link = calls
            .iter()
            .position(|c| matches!(c, GlCall::LinkProgram(_)))
            .unwrap();

        assert!(calls[..first_buffer].iter().all(|c| !c.is_resource_call()));
        assert!(first_buffer < first_shader);
        assert!(first_shader < link);
    }
}
