//! Position state machines for the slider.
//!
//! Two named variants share one contract ([`Navigator`]):
//!
//! - [`SlideNavigator`]: one position per image (the single-row slide view).
//! - [`PageNavigator`]: one position per page of up to [`PAGE_SIZE`] images
//!   (the 3x3 grid view). Indicators and prev/next move between pages.
//!
//! Moving to an out-of-range or unchanged position is a silent no-op. Every
//! effective move publishes exactly one [`NavigatorEvent`] before returning.
//! Replacing the items resets to position 0 without publishing.

use crate::events::{Event, EventBus};
use crate::types::ImageDescriptor;

/// Images per page in grid layout.
pub const PAGE_SIZE: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigatorEvent {
    SlideChanged { current_index: usize, total: usize },
    PageChanged { current_page: usize, total_pages: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigatorEventKind {
    SlideChanged,
    PageChanged,
}

impl Event for NavigatorEvent {
    type Kind = NavigatorEventKind;

    fn kind(&self) -> NavigatorEventKind {
        match self {
            NavigatorEvent::SlideChanged { .. } => NavigatorEventKind::SlideChanged,
            NavigatorEvent::PageChanged { .. } => NavigatorEventKind::PageChanged,
        }
    }
}

/// Shared slide/page position contract.
pub trait Navigator: std::fmt::Debug {
    /// Number of positions (slides or pages).
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current position, `None` when there are no positions.
    fn current(&self) -> Option<usize>;

    /// Move to `index`. Returns whether the position changed.
    fn go_to(&mut self, index: usize) -> bool;

    fn next(&mut self) -> bool {
        let n = self.len();
        match self.current() {
            Some(c) if n > 1 => self.go_to((c + 1) % n),
            _ => false,
        }
    }

    fn previous(&mut self) -> bool {
        let n = self.len();
        match self.current() {
            Some(c) if n > 1 => self.go_to((c + n - 1) % n),
            _ => false,
        }
    }

    /// Replace the images and reset to position 0. Publishes nothing.
    fn update_items(&mut self, images: Vec<ImageDescriptor>);

    /// The full, unpaginated image list.
    fn images(&self) -> &[ImageDescriptor];

    fn events_mut(&mut self) -> &mut EventBus<NavigatorEvent>;
}

#[derive(Debug, Default, Clone, Copy)]
struct Cursor {
    index: usize,
    len: usize,
}

impl Cursor {
    fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    fn current(&self) -> Option<usize> {
        (self.len > 0).then_some(self.index)
    }

    fn move_to(&mut self, index: usize) -> bool {
        if index >= self.len || index == self.index {
            return false;
        }
        self.index = index;
        true
    }
}

// =============================================================================
// Slide navigator
// =============================================================================

/// One position per image.
#[derive(Debug)]
pub struct SlideNavigator {
    images: Vec<ImageDescriptor>,
    cursor: Cursor,
    events: EventBus<NavigatorEvent>,
}

impl SlideNavigator {
    pub fn new(images: Vec<ImageDescriptor>) -> Self {
        let cursor = Cursor::new(images.len());
        Self {
            images,
            cursor,
            events: EventBus::new(),
        }
    }

    pub fn current_image(&self) -> Option<&ImageDescriptor> {
        self.cursor.current().and_then(|i| self.images.get(i))
    }
}

impl Navigator for SlideNavigator {
    fn len(&self) -> usize {
        self.images.len()
    }

    fn current(&self) -> Option<usize> {
        self.cursor.current()
    }

    fn go_to(&mut self, index: usize) -> bool {
        if !self.cursor.move_to(index) {
            return false;
        }
        log::debug!("slide -> {}/{}", index + 1, self.images.len());
        self.events.publish(&NavigatorEvent::SlideChanged {
            current_index: index,
            total: self.images.len(),
        });
        true
    }

    fn update_items(&mut self, images: Vec<ImageDescriptor>) {
        self.cursor = Cursor::new(images.len());
        self.images = images;
    }

    fn images(&self) -> &[ImageDescriptor] {
        &self.images
    }

    fn events_mut(&mut self) -> &mut EventBus<NavigatorEvent> {
        &mut self.events
    }
}

// =============================================================================
// Page navigator
// =============================================================================

/// Number of pages needed for `image_count` images.
pub fn page_count_for(image_count: usize) -> usize {
    image_count.div_ceil(PAGE_SIZE)
}

/// Split `items` into consecutive pages of at most [`PAGE_SIZE`].
pub fn paginate<T>(items: &[T]) -> Vec<&[T]> {
    items.chunks(PAGE_SIZE).collect()
}

/// One position per page of up to [`PAGE_SIZE`] images.
///
/// Images keep their absolute index: slot `s` on page `p` is image
/// `p * PAGE_SIZE + s`, which is what the lightbox is addressed by.
#[derive(Debug)]
pub struct PageNavigator {
    images: Vec<ImageDescriptor>,
    cursor: Cursor,
    events: EventBus<NavigatorEvent>,
}

impl PageNavigator {
    pub fn new(images: Vec<ImageDescriptor>) -> Self {
        let cursor = Cursor::new(page_count_for(images.len()));
        Self {
            images,
            cursor,
            events: EventBus::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.cursor.len
    }

    /// Images on page `page`, or `None` past the last page.
    pub fn page(&self, page: usize) -> Option<&[ImageDescriptor]> {
        self.images.chunks(PAGE_SIZE).nth(page)
    }

    pub fn current_page(&self) -> Option<&[ImageDescriptor]> {
        self.cursor.current().and_then(|p| self.page(p))
    }

    /// Absolute image index of `slot` on `page`, if that image exists.
    pub fn absolute_index(&self, page: usize, slot: usize) -> Option<usize> {
        if slot >= PAGE_SIZE {
            return None;
        }
        let index = page * PAGE_SIZE + slot;
        (index < self.images.len()).then_some(index)
    }

    /// Page holding the image at `absolute_index`.
    pub fn page_of(&self, absolute_index: usize) -> Option<usize> {
        (absolute_index < self.images.len()).then_some(absolute_index / PAGE_SIZE)
    }
}

impl Navigator for PageNavigator {
    fn len(&self) -> usize {
        self.cursor.len
    }

    fn current(&self) -> Option<usize> {
        self.cursor.current()
    }

    fn go_to(&mut self, page: usize) -> bool {
        if !self.cursor.move_to(page) {
            return false;
        }
        log::debug!("page -> {}/{}", page + 1, self.cursor.len);
        self.events.publish(&NavigatorEvent::PageChanged {
            current_page: page,
            total_pages: self.cursor.len,
        });
        true
    }

    fn update_items(&mut self, images: Vec<ImageDescriptor>) {
        self.cursor = Cursor::new(page_count_for(images.len()));
        self.images = images;
    }

    fn images(&self) -> &[ImageDescriptor] {
        &self.images
    }

    fn events_mut(&mut self) -> &mut EventBus<NavigatorEvent> {
        &mut self.events
    }
}
