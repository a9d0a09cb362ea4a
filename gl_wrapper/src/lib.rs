pub mod backend;
pub mod geometry;
pub mod program;
pub mod recording;
pub mod renderer;
#[cfg(target_arch = "wasm32")]
pub mod webgl;

pub use backend::{ContextError, ContextProvider, GlBackend, SurfaceDesc};
