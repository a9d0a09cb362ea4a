use thiserror::Error;

use crate::backend::{AttribPointer, BufferData, BufferTarget, BufferUsage, GlBackend};

/// Uploads one typed array into a new GPU buffer.
pub struct BufferBuilder<'a> {
    data: BufferData<'a>,
    attribute: Option<VertexAttribute>,
    usage: BufferUsage,
}

impl<'a> BufferBuilder<'a> {
    pub fn vertices(data: &'a [f32], attribute: VertexAttribute) -> Self {
        Self {
            data: BufferData::F32(data),
            attribute: Some(attribute),
            usage: BufferUsage::Static,
        }
    }

    pub fn indices(data: &'a [u16]) -> Self {
        Self {
            data: BufferData::U16(data),
            attribute: None,
            usage: BufferUsage::Static,
        }
    }

    pub fn build<B: GlBackend>(self, gl: &B) -> Result<Buffer<B>, GBError> {
        if let Some(attr) = &self.attribute {
            if self.data.len() % attr.size() != 0 {
                return Err(GBError::InvalidDataLength);
            }
        }

        let target = self.data.target();
        let handle = gl.create_buffer().ok_or(GBError::Creation)?;

        gl.bind_buffer(target, Some(&handle));
        gl.buffer_data(target, self.data, self.usage);

        let elements = match &self.attribute {
            Some(attr) => self.data.len() / attr.size(),
            None => self.data.len(),
        };

        Ok(Buffer {
            handle,
            target,
            attribute: self.attribute,
            elements,
        })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GBError {
    #[error("Invalid data length for given attributes")]
    InvalidDataLength,
    #[error("Could not create buffer")]
    Creation,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum VertexAttribute {
    Float,
    Vec2,
    Vec3,
}

impl VertexAttribute {
    pub fn size(&self) -> usize {
        match self {
            VertexAttribute::Float => 1,
            VertexAttribute::Vec2 => 2,
            VertexAttribute::Vec3 => 3,
        }
    }

    /// Tightly packed float pointer for a buffer holding only this attribute.
    pub fn pointer(&self) -> AttribPointer {
        AttribPointer {
            size: self.size() as i32,
            normalized: false,
            stride: (self.size() * std::mem::size_of::<f32>()) as i32,
            offset: 0,
        }
    }
}

pub struct Buffer<B: GlBackend> {
    handle: B::Buffer,
    target: BufferTarget,
    attribute: Option<VertexAttribute>,
    elements: usize,
}

impl<B: GlBackend> Buffer<B> {
    pub fn handle(&self) -> &B::Buffer {
        &self.handle
    }

    pub fn target(&self) -> BufferTarget {
        self.target
    }

    pub fn attribute(&self) -> Option<VertexAttribute> {
        self.attribute
    }

    /// Vertices for attribute buffers, indices for element buffers.
    pub fn elements(&self) -> usize {
        self.elements
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{ContextProvider, SurfaceDesc};
    use crate::recording::{GlCall, OwnedData, RecordingProvider};

    fn backend(provider: &RecordingProvider) -> crate::recording::RecordingBackend {
        provider
            .acquire(&SurfaceDesc {
                element_id: "webgl".to_owned(),
                width: 8,
                height: 8,
            })
            .unwrap()
    }

    #[test]
    fn vertex_buffer_goes_to_array_target() {
        let provider = RecordingProvider::default();
        let gl = backend(&provider);

        let data = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let buffer = BufferBuilder::vertices(&data, VertexAttribute::Vec3)
            .build(&gl)
            .unwrap();

        assert_eq!(buffer.elements(), 2);
        assert_eq!(buffer.target(), BufferTarget::Array);
        assert_eq!(
            provider.calls()[2],
            GlCall::BufferData(
                BufferTarget::Array,
                OwnedData::F32(data.to_vec()),
                BufferUsage::Static
            )
        );
    }

    #[test]
    fn index_buffer_goes_to_element_target() {
        let provider = RecordingProvider::default();
        let gl = backend(&provider);

        let buffer = BufferBuilder::indices(&[0, 1, 2]).build(&gl).unwrap();

        assert_eq!(buffer.elements(), 3);
        assert_eq!(buffer.target(), BufferTarget::ElementArray);
        assert_eq!(buffer.attribute(), None);
    }

    #[test]
    fn rejects_partial_vertices() {
        let provider = RecordingProvider::default();
        let gl = backend(&provider);

        let res = BufferBuilder::vertices(&[0.0; 4], VertexAttribute::Vec3).build(&gl);

        assert_eq!(res.err(), Some(GBError::InvalidDataLength));
        assert!(provider.calls().is_empty());
    }

    #[test]
    fn vec3_pointer_is_tightly_packed() {
        let p = VertexAttribute::Vec3.pointer();
        assert_eq!(p.size, 3);
        assert_eq!(p.stride, 12);
        assert_eq!(p.offset, 0);
        assert!(!p.normalized);
    }
}
