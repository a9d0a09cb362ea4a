use crate::backend::{
    BlendFactor, Capability, ClearMask, DepthFunc, Face, GlBackend, IndexType, Primitive,
};
use crate::geometry::Buffer;
use crate::program::Program;

/// Global pipeline state set once after the context is acquired.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FixedState {
    pub clear_color: [f32; 4],
    pub color_mask: [bool; 4],
    pub depth_test: Option<DepthFunc>,
    pub cull_face: Face,
    /// Only sets the face mode when false; culling itself stays off.
    pub cull_enabled: bool,
    pub blend_func: (BlendFactor, BlendFactor),
    pub blend_enabled: bool,
}

impl Default for FixedState {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 0.0],
            color_mask: [true; 4],
            depth_test: Some(DepthFunc::LessOrEqual),
            cull_face: Face::Back,
            cull_enabled: false,
            blend_func: (BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha),
            blend_enabled: false,
        }
    }
}

pub struct GlRenderer<'a, B: GlBackend> {
    gl: &'a B,
}

impl<'a, B: GlBackend> GlRenderer<'a, B> {
    pub fn new(gl: &'a B) -> Self {
        Self { gl }
    }

    pub fn apply_state(&self, state: &FixedState) {
        let [r, g, b, a] = state.clear_color;
        self.gl.clear_color(r, g, b, a);

        let [r, g, b, a] = state.color_mask;
        self.gl.color_mask(r, g, b, a);

        if let Some(func) = state.depth_test {
            self.gl.enable(Capability::DepthTest);
            self.gl.depth_func(func);
        }

        if state.cull_enabled {
            self.gl.enable(Capability::CullFace);
        }
        self.gl.cull_face(state.cull_face);

        if state.blend_enabled {
            self.gl.enable(Capability::Blend);
        }
        self.gl.blend_func(state.blend_func.0, state.blend_func.1);
    }

    /// Clears the surface, activates `program` and covers the whole surface
    /// with viewport and scissor. Returns the size used.
    pub fn begin_frame(&self, program: &Program<B>) -> (u32, u32) {
        self.gl.clear(ClearMask::COLOR_DEPTH);
        self.gl.use_program(Some(program.handle()));

        let (width, height) = self.gl.surface_size();
        self.gl.viewport(0, 0, width as i32, height as i32);
        self.gl.scissor(0, 0, width as i32, height as i32);

        (width, height)
    }

    /// Wires a vertex buffer to the named program input.
    ///
    /// Returns false when the program has no such input, in which case the
    /// buffer is bound but no attribute slot is touched.
    pub fn bind_attribute(&self, program: &Program<B>, buffer: &Buffer<B>, name: &str) -> bool {
        self.gl.bind_buffer(buffer.target(), Some(buffer.handle()));

        let (Some(location), Some(attr)) = (program.attrib_location(self.gl, name), buffer.attribute())
        else {
            return false;
        };

        self.gl.vertex_attrib_pointer(location, attr.pointer());
        self.gl.enable_vertex_attrib_array(location);

        true
    }

    pub fn draw_indexed(&self, indices: &Buffer<B>) {
        self.gl.bind_buffer(indices.target(), Some(indices.handle()));
        self.gl.draw_elements(
            Primitive::Triangles,
            indices.elements() as i32,
            IndexType::UnsignedShort,
            0,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BufferTarget, ContextProvider, SurfaceDesc};
    use crate::geometry::BufferBuilder;
    use crate::recording::{GlCall, RecordingBackend, RecordingProvider};

    fn backend(provider: &RecordingProvider) -> RecordingBackend {
        provider
            .acquire(&SurfaceDesc {
                element_id: "webgl".to_owned(),
                width: 8,
                height: 8,
            })
            .unwrap()
    }

    #[test]
    fn default_state_leaves_culling_and_blending_off() {
        let provider = RecordingProvider::default();
        let gl = backend(&provider);

        GlRenderer::new(&gl).apply_state(&FixedState::default());

        assert_eq!(
            provider.calls(),
            vec![
                GlCall::ClearColor([0.0, 0.0, 0.0, 0.0]),
                GlCall::ColorMask([true; 4]),
                GlCall::Enable(Capability::DepthTest),
                GlCall::DepthFunc(DepthFunc::LessOrEqual),
                GlCall::CullFace(Face::Back),
                GlCall::BlendFunc(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha),
            ]
        );
    }

    #[test]
    fn draws_every_index_as_unsigned_short() {
        let provider = RecordingProvider::default();
        let gl = backend(&provider);
        let indices = BufferBuilder::indices(&[0, 1, 2, 2, 1, 0]).build(&gl).unwrap();
        provider.clear_calls();

        GlRenderer::new(&gl).draw_indexed(&indices);

        assert_eq!(
            provider.calls(),
            vec![
                GlCall::BindBuffer(BufferTarget::ElementArray, Some(1)),
                GlCall::DrawElements(Primitive::Triangles, 6, IndexType::UnsignedShort, 0),
            ]
        );
    }
}
