pub mod config;
pub mod frame_loop;
pub mod framebuffer;
pub mod raster;
pub mod scene;
pub mod session;

#[cfg(target_arch = "wasm32")]
mod logger;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::SessionConfig;
pub use frame_loop::{FrameLoop, FrameScheduler};
pub use scene::Scene;
pub use session::{RenderSession, SessionError};
