use std::time::Duration;
use calloop::timer::{TimeoutAction, Timer};
use calloop::{LoopHandle, RegistrationToken};
use log::debug;
use crate::state::QueryPipeline;

/// Event-loop data that owns a pipeline and its debouncer.
pub trait SearchHost: Sized + 'static {
    fn pipeline(&mut self) -> &mut QueryPipeline;
    fn debouncer(&mut self) -> &mut Debouncer<Self>;
}

/// Delays searches until typing pauses. At most one timer is pending.
pub struct Debouncer<D: 'static> {
    handle: LoopHandle<'static, D>,
    delay: Duration,
    pending: Option<RegistrationToken>,
}

impl<D: SearchHost> Debouncer<D> {
    pub fn new(handle: LoopHandle<'static, D>, delay: Duration) -> Self {
        Self { handle, delay, pending: None }
    }

    #[cfg(test)]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Replaces any pending search with one for `generation`.
    pub fn schedule(&mut self, generation: u64) -> calloop::Result<()> {
        self.cancel();

        let token = self.handle
            .insert_source(Timer::from_duration(self.delay), move |_, _, data: &mut D| {
                data.debouncer().pending = None;
                // The pipeline re-checks the generation before publishing
                data.pipeline().run_search(generation);
                TimeoutAction::Drop
            })
            .map_err(|e| e.error)?;

        self.pending = Some(token);
        Ok(())
    }

    pub fn cancel(&mut self) {
        if let Some(token) = self.pending.take() {
            debug!("Debouncer: cancelling pending search");
            self.handle.remove(token);
        }
    }
}

/// Feeds `text` to the host's pipeline and schedules or cancels the search.
pub fn update_query<D: SearchHost>(host: &mut D, text: &str) -> calloop::Result<()> {
    match host.pipeline().set_query(text) {
        Some(generation) => host.debouncer().schedule(generation),
        None => {
            if text.is_empty() {
                host.debouncer().cancel();
            }
            Ok(())
        }
    }
}

/// Runs a pending search now instead of waiting for the timer.
pub fn flush<D: SearchHost>(host: &mut D) {
    host.debouncer().cancel();
    if host.pipeline().search_pending() {
        let generation = host.pipeline().query().generation;
        host.pipeline().run_search(generation);
    }
}
