use cgmath::Vector3;

pub const POSITION_ATTRIBUTE: &str = "inPosition";
pub const COLOR_ATTRIBUTE: &str = "inColor";

#[rustfmt::skip]
pub const TRIANGLE_POSITIONS: [f32; 9] = [
    1.0, -1.0, 0.0,
    -1.0, -1.0, 0.0,
    0.0, 1.0, 0.0,
];

#[rustfmt::skip]
pub const TRIANGLE_COLORS: [f32; 9] = [
    1.0, 0.0, 0.0,
    0.0, 1.0, 0.0,
    0.0, 0.0, 1.0,
];

pub const TRIANGLE_INDICES: [u16; 3] = [0, 1, 2];

pub const VERTEX_SHADER: &str = include_str!("shaders/triangle.vert");
pub const FRAGMENT_SHADER: &str = include_str!("shaders/triangle.frag");

/// Geometry and shader sources uploaded by a render session.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub positions: Vec<f32>,
    pub colors: Vec<f32>,
    pub indices: Vec<u16>,
    pub vertex_shader: String,
    pub fragment_shader: String,
}

impl Scene {
    pub fn triangle() -> Self {
        Self {
            positions: TRIANGLE_POSITIONS.to_vec(),
            colors: TRIANGLE_COLORS.to_vec(),
            indices: TRIANGLE_INDICES.to_vec(),
            vertex_shader: VERTEX_SHADER.to_owned(),
            fragment_shader: FRAGMENT_SHADER.to_owned(),
        }
    }

    pub fn with_shaders(mut self, vertex: &str, fragment: &str) -> Self {
        self.vertex_shader = vertex.to_owned();
        self.fragment_shader = fragment.to_owned();
        self
    }

    pub fn position(&self, index: u16) -> Option<Vector3<f32>> {
        vec3_at(&self.positions, index)
    }

    pub fn color(&self, index: u16) -> Option<Vector3<f32>> {
        vec3_at(&self.colors, index)
    }

    /// Index triples, one per triangle.
    pub fn triangles(&self) -> impl Iterator<Item = [u16; 3]> + '_ {
        self.indices.chunks_exact(3).map(|c| [c[0], c[1], c[2]])
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::triangle()
    }
}

fn vec3_at(data: &[f32], index: u16) -> Option<Vector3<f32>> {
    let start = index as usize * 3;
    let v = data.get(start..start + 3)?;
    Some(Vector3::new(v[0], v[1], v[2]))
}
