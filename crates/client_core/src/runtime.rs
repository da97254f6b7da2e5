//! Async driver for [`FormScreen`].
//!
//! All state changes happen on the task running [`FormRuntime::run`], one
//! event at a time in arrival order. Lookups and submissions run on spawned
//! tasks and report back by pushing a completion event onto the same queue,
//! so user input keeps flowing while they are outstanding.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{
    mpsc::{self, UnboundedReceiver, UnboundedSender, WeakUnboundedSender},
    watch,
};
use tracing::{debug, info, warn};

use crate::{
    cascade::LookupRequest,
    directory::LocationDirectory,
    error::DirectoryError,
    screen::{FormEffect, FormEvent, FormScreen, FormView},
    submission::{SubmissionAssembler, SubmissionEndpoint},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("form runtime has stopped")]
pub struct RuntimeStopped;

pub struct FormRuntime {
    screen: FormScreen,
    directory: Arc<dyn LocationDirectory>,
    assembler: SubmissionAssembler,
    events: UnboundedReceiver<FormEvent>,
    // Weak so the queue closes once every handle and in-flight task is gone.
    feedback: WeakUnboundedSender<FormEvent>,
    view: watch::Sender<FormView>,
}

#[derive(Clone)]
pub struct FormHandle {
    events: UnboundedSender<FormEvent>,
    view: watch::Receiver<FormView>,
}

impl FormRuntime {
    pub fn new(
        directory: Arc<dyn LocationDirectory>,
        endpoint: Arc<dyn SubmissionEndpoint>,
    ) -> (Self, FormHandle) {
        let screen = FormScreen::new();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (view_tx, view_rx) = watch::channel(screen.view());
        let runtime = Self {
            screen,
            directory,
            assembler: SubmissionAssembler::new(endpoint),
            events: events_rx,
            feedback: events_tx.downgrade(),
            view: view_tx,
        };
        let handle = FormHandle {
            events: events_tx,
            view: view_rx,
        };
        (runtime, handle)
    }

    /// Processes events until every [`FormHandle`] is dropped and no lookup
    /// or submission is still outstanding.
    pub async fn run(mut self) {
        info!("form runtime started");
        while let Some(event) = self.events.recv().await {
            match self.screen.handle(event) {
                Ok(Some(effect)) => self.dispatch(effect),
                Ok(None) => {}
                Err(err) => warn!(error = %err, "form event rejected"),
            }
            self.view.send_replace(self.screen.view());
        }
        info!("form runtime stopped");
    }

    fn dispatch(&mut self, effect: FormEffect) {
        let Some(feedback) = self.feedback.upgrade() else {
            debug!(?effect, "event queue closed; dropping effect");
            self.screen.abandon(&effect);
            return;
        };
        match effect {
            FormEffect::Lookup(request) => {
                debug!(?request, "dispatching lookup");
                let directory = Arc::clone(&self.directory);
                tokio::spawn(async move {
                    let result = perform_lookup(directory.as_ref(), &request).await;
                    let _ = feedback.send(FormEvent::LookupCompleted { request, result });
                });
            }
            FormEffect::Submit(payload) => {
                let assembler = self.assembler.clone();
                tokio::spawn(async move {
                    let result = assembler.submit(&payload).await;
                    let _ = feedback.send(FormEvent::SubmissionCompleted(result));
                });
            }
        }
    }
}

async fn perform_lookup(
    directory: &dyn LocationDirectory,
    request: &LookupRequest,
) -> Result<Vec<String>, DirectoryError> {
    match request {
        LookupRequest::Divisions { .. } => directory.list_divisions().await,
        LookupRequest::Districts { division, .. } => directory.list_districts(division).await,
        LookupRequest::Upazilas { district, .. } => directory.list_upazilas(district).await,
    }
}

impl FormHandle {
    pub fn send(&self, event: FormEvent) -> Result<(), RuntimeStopped> {
        self.events.send(event).map_err(|_| RuntimeStopped)
    }

    pub fn view(&self) -> FormView {
        self.view.borrow().clone()
    }

    pub async fn wait_for(
        &mut self,
        predicate: impl FnMut(&FormView) -> bool,
    ) -> Result<FormView, RuntimeStopped> {
        let view = self
            .view
            .wait_for(predicate)
            .await
            .map_err(|_| RuntimeStopped)?;
        Ok((*view).clone())
    }

    /// Sends `event` and waits until it has been processed and every lookup or
    /// submission it started has completed. Meant for a single driver; events
    /// sent concurrently through other handles also count toward settling.
    pub async fn settle(&mut self, event: FormEvent) -> Result<FormView, RuntimeStopped> {
        let before = self.view.borrow().revision;
        self.send(event)?;
        self.wait_for(|view| view.revision > before && view.is_settled())
            .await
    }
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
