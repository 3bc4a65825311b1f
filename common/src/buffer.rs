//! Chunk buffering between the host recorder's callbacks and finalize.

use futures::channel::oneshot;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Recorder lifecycle. `Stopped` is terminal; there is no pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecorderState {
    #[default]
    Idle,
    Recording,
    Stopped,
}

/// Ordered, append-only sequence of opaque chunks.
#[derive(Debug)]
pub struct ChunkBuffer<C> {
    chunks: Vec<C>,
}

impl<C> ChunkBuffer<C> {
    pub fn new() -> Self {
        Self { chunks: Vec::new() }
    }

    pub fn push(&mut self, chunk: C) {
        self.chunks.push(chunk);
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Hand out every chunk in delivery order, leaving the buffer empty.
    pub fn drain(&mut self) -> Vec<C> {
        std::mem::take(&mut self.chunks)
    }
}

impl<C> Default for ChunkBuffer<C> {
    fn default() -> Self {
        Self::new()
    }
}

pub type SharedChunkBuffer<C> = Rc<RefCell<ChunkBuffer<C>>>;

/// Handle the host recorder calls from its chunk-available and stop
/// callbacks. Cheap to clone; every clone feeds the same buffer.
pub struct RecorderEvents<C> {
    inner: Rc<EventsInner<C>>,
}

struct EventsInner<C> {
    state: Cell<RecorderState>,
    buffer: SharedChunkBuffer<C>,
    stop_tx: RefCell<Option<oneshot::Sender<()>>>,
}

impl<C> Clone for RecorderEvents<C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<C> RecorderEvents<C> {
    /// Create the handle and the receiver that resolves once the recorder
    /// reports it has stopped.
    pub fn new(buffer: SharedChunkBuffer<C>) -> (Self, oneshot::Receiver<()>) {
        let (stop_tx, stop_rx) = oneshot::channel();
        let events = Self {
            inner: Rc::new(EventsInner {
                state: Cell::new(RecorderState::Idle),
                buffer,
                stop_tx: RefCell::new(Some(stop_tx)),
            }),
        };
        (events, stop_rx)
    }

    pub fn state(&self) -> RecorderState {
        self.inner.state.get()
    }

    pub(crate) fn begin(&self) {
        if self.inner.state.get() == RecorderState::Idle {
            self.inner.state.set(RecorderState::Recording);
        }
    }

    /// Append a chunk. Chunks arriving outside `Recording` are dropped.
    pub fn chunk_available(&self, chunk: C) {
        let state = self.inner.state.get();
        if state != RecorderState::Recording {
            log::debug!("Dropping chunk delivered while recorder is {:?}", state);
            return;
        }
        let mut buffer = self.inner.buffer.borrow_mut();
        buffer.push(chunk);
        log::debug!("Buffered chunk #{}", buffer.len());
    }

    /// Mark the recorder stopped and release whoever awaits the stop signal.
    /// Later calls are no-ops.
    pub fn stopped(&self) {
        self.inner.state.set(RecorderState::Stopped);
        if let Some(tx) = self.inner.stop_tx.borrow_mut().take() {
            let _ = tx.send(());
        }
    }
}
