use cgmath::Vector3;

/// CPU color + depth target, rows stored top to bottom.
pub struct FrameBuffer {
    width: usize,
    height: usize,
    buffer: Vec<Pixel>,
    depth: Vec<f32>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            buffer: vec![Pixel::transparent(); width * height],
            depth: vec![1.0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self, color: Pixel, depth: f32) {
        self.buffer.fill(color);
        self.depth.fill(depth);
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }

        Some(x + y * self.width)
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Pixel> {
        self.index(x, y).map(|i| self.buffer[i])
    }

    pub fn pixel_mut(&mut self, x: usize, y: usize) -> Option<&mut Pixel> {
        let index = self.index(x, y)?;
        Some(&mut self.buffer[index])
    }

    pub fn depth(&self, x: usize, y: usize) -> Option<f32> {
        self.index(x, y).map(|i| self.depth[i])
    }

    pub fn depth_mut(&mut self, x: usize, y: usize) -> Option<&mut f32> {
        let index = self.index(x, y)?;
        Some(&mut self.depth[index])
    }

    pub fn buffer(&self) -> &[Pixel] {
        &self.buffer
    }

    /// 8-bit RGBA, clamped, in row order.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.buffer
            .iter()
            .flat_map(|p| [p.r, p.g, p.b, p.a])
            .map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
            .collect()
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Pixel {
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn transparent() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    pub fn from_rgba(c: [f32; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }
}

/// Opaque pixel from an RGB vector.
impl From<Vector3<f32>> for Pixel {
    fn from(v: Vector3<f32>) -> Self {
        Self::new(v.x, v.y, v.z, 1.0)
    }
}
