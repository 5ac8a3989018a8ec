//! Full-size single-image viewer state.
//!
//! The lightbox is addressed by absolute image index over the full,
//! unpaginated list, so it behaves the same whether the slider underneath
//! shows one image or a 3x3 page. Opening an index past the end is rejected
//! and leaves the state untouched.

use crate::events::{Event, EventBus};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LightboxError {
    #[error("image index {index} out of range for {len} images")]
    OutOfRange { index: usize, len: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightboxEvent {
    Opened { index: usize },
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightboxEventKind {
    Opened,
    Closed,
}

impl Event for LightboxEvent {
    type Kind = LightboxEventKind;

    fn kind(&self) -> LightboxEventKind {
        match self {
            LightboxEvent::Opened { .. } => LightboxEventKind::Opened,
            LightboxEvent::Closed => LightboxEventKind::Closed,
        }
    }
}

#[derive(Debug)]
pub struct Lightbox {
    len: usize,
    /// `Some(index)` exactly when open.
    open: Option<usize>,
    events: EventBus<LightboxEvent>,
}

impl Lightbox {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            open: None,
            events: EventBus::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Displayed image, `None` while closed.
    pub fn current(&self) -> Option<usize> {
        self.open
    }

    pub fn open(&mut self, index: usize) -> Result<(), LightboxError> {
        if index >= self.len {
            return Err(LightboxError::OutOfRange {
                index,
                len: self.len,
            });
        }
        self.open = Some(index);
        log::debug!("lightbox open at {index}");
        self.events.publish(&LightboxEvent::Opened { index });
        Ok(())
    }

    pub fn close(&mut self) {
        if self.open.take().is_some() {
            log::debug!("lightbox closed");
            self.events.publish(&LightboxEvent::Closed);
        }
    }

    /// Show the following image, wrapping. No-op while closed.
    pub fn next(&mut self) -> bool {
        self.step(1)
    }

    /// Show the preceding image, wrapping. No-op while closed.
    pub fn previous(&mut self) -> bool {
        self.step(self.len.saturating_sub(1))
    }

    fn step(&mut self, offset: usize) -> bool {
        let Some(index) = self.open else {
            return false;
        };
        let target = (index + offset) % self.len;
        if target == index {
            return false;
        }
        self.open = Some(target);
        self.events.publish(&LightboxEvent::Opened { index: target });
        true
    }

    /// Adopt a new image count. Closes the viewer.
    pub fn set_len(&mut self, len: usize) {
        self.close();
        self.len = len;
    }

    pub fn events_mut(&mut self) -> &mut EventBus<LightboxEvent> {
        &mut self.events
    }
}
