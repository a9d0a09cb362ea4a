use std::cell::Cell;

use thiserror::Error;

use gl_wrapper::GlBackend;

use crate::session::{FrameInfo, RenderSession};

/// Host facility that calls back once per display refresh.
pub trait FrameScheduler {
    /// Asks for one more callback and returns its request id.
    fn request_frame(&self) -> Result<i32, SchedulerError>;
    fn cancel_frame(&self, id: i32);
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("No browser window available")]
    NoWindow,
    #[error("Frame callback not installed")]
    NoCallback,
    #[error("Could not request animation frame: {0}")]
    Request(String),
}

/// Redraws a [`RenderSession`] on every refresh until stopped.
///
/// Each [`step`](FrameLoop::step) renders one frame and then requests the
/// next one, so frames never overlap. The id of the outstanding request is
/// kept so [`stop`](FrameLoop::stop) can cancel it.
pub struct FrameLoop<B: GlBackend, S: FrameScheduler> {
    session: RenderSession<B>,
    scheduler: S,
    stopped: Cell<bool>,
    pending: Cell<Option<i32>>,
    frames: Cell<u64>,
}

impl<B: GlBackend, S: FrameScheduler> FrameLoop<B, S> {
    pub fn new(session: RenderSession<B>, scheduler: S) -> Self {
        Self {
            session,
            scheduler,
            stopped: Cell::new(false),
            pending: Cell::new(None),
            frames: Cell::new(0),
        }
    }

    /// Renders the first frame right away and schedules the rest.
    pub fn start(&self) -> Result<(), SchedulerError> {
        log::info!("Starting frame loop");
        self.step().map(|_| ())
    }

    /// Body of the refresh callback.
    ///
    /// Returns `None` without drawing once the loop is stopped. A failed
    /// request stops the loop, since no callback will follow it.
    pub fn step(&self) -> Result<Option<FrameInfo>, SchedulerError> {
        self.pending.set(None);

        if self.stopped.get() {
            return Ok(None);
        }

        let info = self.session.render_frame();
        self.frames.set(self.frames.get() + 1);

        let id = match self.scheduler.request_frame() {
            Ok(id) => id,
            Err(e) => {
                self.stopped.set(true);
                log::error!("Frame loop stopped after {} frames: {e}", self.frames.get());
                return Err(e);
            }
        };
        self.pending.set(Some(id));

        Ok(Some(info))
    }

    pub fn stop(&self) {
        if self.stopped.replace(true) {
            return;
        }

        if let Some(id) = self.pending.take() {
            self.scheduler.cancel_frame(id);
        }

        log::info!("Frame loop stopped after {} frames", self.frames.get());
    }

    pub fn is_running(&self) -> bool {
        !self.stopped.get()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames.get()
    }

    /// Id of the refresh request that will run the next frame.
    pub fn pending_frame(&self) -> Option<i32> {
        self.pending.get()
    }

    pub fn session(&self) -> &RenderSession<B> {
        &self.session
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }
}
