use std::cell::RefCell;
use std::rc::Rc;

use log::LevelFilter;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use gl_wrapper::webgl::{CanvasProvider, WebGlBackend};

use crate::config::SessionConfig;
use crate::frame_loop::{FrameLoop, FrameScheduler, SchedulerError};
use crate::logger;
use crate::scene::Scene;
use crate::session::RenderSession;

type Callback = Closure<dyn FnMut()>;

/// `requestAnimationFrame` with a callback installed after construction.
#[derive(Clone, Default)]
pub struct RafScheduler {
    callback: Rc<RefCell<Option<Callback>>>,
}

impl RafScheduler {
    pub fn install(&self, callback: Callback) {
        *self.callback.borrow_mut() = Some(callback);
    }
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&self) -> Result<i32, SchedulerError> {
        let window = web_sys::window().ok_or(SchedulerError::NoWindow)?;
        let callback = self.callback.borrow();
        let callback = callback.as_ref().ok_or(SchedulerError::NoCallback)?;

        window
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .map_err(|e| SchedulerError::Request(format!("{e:?}")))
    }

    fn cancel_frame(&self, id: i32) {
        let Some(window) = web_sys::window() else {
            log::warn!("No window to cancel animation frame {id}");
            return;
        };

        if let Err(e) = window.cancel_animation_frame(id) {
            log::warn!("Could not cancel animation frame {id}: {e:?}");
        }
    }
}

type WebFrameLoop = FrameLoop<WebGlBackend, RafScheduler>;

/// JS-side control over a running frame loop.
#[wasm_bindgen]
pub struct FrameLoopHandle {
    inner: Rc<WebFrameLoop>,
}

#[wasm_bindgen]
impl FrameLoopHandle {
    pub fn stop(&self) {
        self.inner.stop();
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.inner.is_running()
    }

    #[wasm_bindgen(js_name = framesRendered)]
    pub fn frames_rendered(&self) -> f64 {
        self.inner.frames_rendered() as f64
    }
}

fn to_js(e: impl std::fmt::Display) -> JsValue {
    let msg = e.to_string();
    log::error!("{msg}");
    JsValue::from_str(&msg)
}

/// Sets up the triangle on the configured canvas and starts redrawing it.
///
/// `config` is an optional JSON object, see [`SessionConfig`].
#[wasm_bindgen]
pub fn start(config: Option<String>) -> Result<FrameLoopHandle, JsValue> {
    logger::init(LevelFilter::Info);

    let config = SessionConfig::from_json(config.as_deref()).map_err(to_js)?;
    log::set_max_level(config.log_level.into());

    let session = RenderSession::new(&CanvasProvider, &config, &Scene::triangle()).map_err(to_js)?;

    let scheduler = RafScheduler::default();
    let frame_loop = Rc::new(FrameLoop::new(session, scheduler.clone()));

    let callback_loop = Rc::clone(&frame_loop);
    scheduler.install(Closure::new(move || {
        if let Err(e) = callback_loop.step() {
            log::error!("Frame loop halted: {e}");
        }
    }));

    frame_loop.start().map_err(to_js)?;

    Ok(FrameLoopHandle { inner: frame_loop })
}
