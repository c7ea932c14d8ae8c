//! Single-occupancy slot for background evaluations.
//!
//! Starting a new evaluation aborts the one in flight. Results carry the
//! generation they were started with, and anything but the latest
//! generation is dropped when polled.

use std::future::Future;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub struct EvaluationSlot<T> {
    generation: u64,
    in_flight: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<(u64, T)>,
    rx: mpsc::UnboundedReceiver<(u64, T)>,
}

impl<T: Send + 'static> Default for EvaluationSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> EvaluationSlot<T> {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            generation: 0,
            in_flight: None,
            tx,
            rx,
        }
    }

    /// Spawn `task` on `runtime`, replacing any evaluation still in flight.
    /// Returns the generation of the new evaluation.
    pub fn start<F>(&mut self, runtime: &Handle, task: F) -> u64
    where
        F: Future<Output = T> + Send + 'static,
    {
        if let Some(previous) = self.in_flight.take() {
            previous.abort();
            tracing::debug!(generation = self.generation, "Superseded in-flight evaluation");
        }

        self.generation += 1;
        let generation = self.generation;
        let tx = self.tx.clone();
        self.in_flight = Some(runtime.spawn(async move {
            let output = task.await;
            // Receiver only goes away with the slot itself
            let _ = tx.send((generation, output));
        }));
        generation
    }

    /// Non-blocking: the latest result if it has arrived.
    ///
    /// A task that finished without sending (it panicked) leaves the slot
    /// idle and yields `None`.
    pub fn poll(&mut self) -> Option<T> {
        // Checked before draining: a finished task has already sent
        let finished = self.in_flight.as_ref().is_some_and(JoinHandle::is_finished);
        while let Ok((generation, output)) = self.rx.try_recv() {
            if let Some(result) = self.accept(generation, output) {
                return Some(result);
            }
        }
        if finished {
            tracing::warn!(generation = self.generation, "Evaluation ended without a result");
            self.in_flight = None;
        }
        None
    }

    /// Wait for the latest evaluation to finish. `None` if nothing is in
    /// flight or the task ended without a result.
    pub async fn wait(&mut self) -> Option<T> {
        let handle = self.in_flight.as_mut()?;
        if let Err(e) = handle.await {
            tracing::warn!(generation = self.generation, "Evaluation task failed: {e}");
        }
        let result = self.poll();
        self.in_flight = None;
        result
    }

    /// Abort the in-flight evaluation, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
            tracing::debug!(generation = self.generation, "Cancelled evaluation");
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    fn accept(&mut self, generation: u64, output: T) -> Option<T> {
        if generation == self.generation && self.in_flight.is_some() {
            self.in_flight = None;
            Some(output)
        } else {
            tracing::debug!(generation, latest = self.generation, "Discarding stale evaluation result");
            None
        }
    }
}
