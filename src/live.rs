//! Live renderer: a slider mounted into a hosting document.
//!
//! The hosting page is modeled as a [`Document`] of named mount points.
//! [`LiveSlider::mount`] takes ownership of one [`Container`], renders the
//! same structure and class names the generated runtime (`static/slider.js`)
//! builds in the browser, and keeps the markup in sync with the navigator,
//! autoplay and lightbox state as [`Input`]s arrive. Time is fed explicitly
//! through [`LiveSlider::advance`].
//!
//! ## Interaction Policy
//!
//! Identical to the runtime:
//! - Pointer enter and touch start pause autoplay; pointer leave and touch
//!   end resume it.
//! - Arrow keys navigate only while the pointer is over the slider; space
//!   toggles autoplay.
//! - While the lightbox is open, Escape and the arrow keys drive the
//!   lightbox instead of the slider.
//! - A horizontal swipe longer than 50px navigates (right-to-left = next).
//!
//! A slider only reacts to inputs for which it registered a [`Binding`];
//! bindings follow the resolved options. [`LiveSlider::destroy`] cancels
//! the interval, drops every binding and subscriber, and hands the
//! container back to the document.

use crate::autoplay::Autoplay;
use crate::config::{Layout, SliderOptions};
use crate::events::EventBus;
use crate::lightbox::{Lightbox, LightboxEvent};
use crate::navigator::{Navigator, NavigatorEvent, PAGE_SIZE, PageNavigator, SlideNavigator, paginate};
use crate::types::ImageDescriptor;
use maud::{Markup, html};
use std::time::Duration;
use thiserror::Error;

/// Minimum horizontal travel, in CSS pixels, for a swipe to navigate.
pub const SWIPE_THRESHOLD: f64 = 50.0;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("no mount point with id '{0}'")]
    MissingMount(String),
}

// =============================================================================
// Document
// =============================================================================

/// A mount point in the hosting page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    id: String,
    html: String,
}

impl Container {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            html: String::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn html(&self) -> &str {
        &self.html
    }
}

/// The hosting page: named mount points, in insertion order.
#[derive(Debug, Default)]
pub struct Document {
    mounts: Vec<Container>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an empty mount point. Replaces an existing one with the same id.
    pub fn add_mount(&mut self, id: impl Into<String>) -> &mut Self {
        let container = Container::new(id);
        self.restore(container);
        self
    }

    pub fn contains(&self, id: &str) -> bool {
        self.mounts.iter().any(|c| c.id == id)
    }

    pub fn mount(&self, id: &str) -> Option<&Container> {
        self.mounts.iter().find(|c| c.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.mounts.iter().map(|c| c.id.as_str())
    }

    fn take(&mut self, id: &str) -> Option<Container> {
        let pos = self.mounts.iter().position(|c| c.id == id)?;
        Some(self.mounts.remove(pos))
    }

    fn restore(&mut self, container: Container) {
        match self.mounts.iter_mut().find(|c| c.id == container.id) {
            Some(slot) => *slot = container,
            None => self.mounts.push(container),
        }
    }
}

// =============================================================================
// Inputs and bindings
// =============================================================================

/// Clickable parts of a mounted slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Prev,
    Next,
    Indicator(usize),
    /// An image, by absolute index into the full list.
    Image(usize),
    LightboxClose,
    LightboxPrev,
    LightboxNext,
    /// The dimmed area around the lightbox image.
    LightboxBackdrop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Space,
    Escape,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Input {
    Click(Target),
    Key(Key),
    TouchStart { x: f64 },
    TouchEnd { x: f64 },
    PointerEnter,
    PointerLeave,
}

/// Input handlers a slider registers, by concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binding {
    Navigation,
    Indicators,
    Keyboard,
    Touch,
    Hover,
    Lightbox,
}

fn bindings_for(options: &SliderOptions, image_count: usize) -> Vec<Binding> {
    if image_count == 0 {
        return Vec::new();
    }
    let mut bindings = Vec::new();
    if options.show_navigation {
        bindings.push(Binding::Navigation);
    }
    if options.show_indicators {
        bindings.push(Binding::Indicators);
    }
    if options.enable_keyboard {
        bindings.push(Binding::Keyboard);
    }
    if options.enable_touch {
        bindings.push(Binding::Touch);
    }
    bindings.push(Binding::Hover);
    if options.lightbox {
        bindings.push(Binding::Lightbox);
    }
    bindings
}

// =============================================================================
// LiveSlider
// =============================================================================

#[derive(Debug)]
pub struct LiveSlider {
    container: Container,
    options: SliderOptions,
    navigator: Box<dyn Navigator>,
    autoplay: Autoplay,
    lightbox: Lightbox,
    bindings: Vec<Binding>,
    hovered: bool,
    touch_start: Option<f64>,
}

impl LiveSlider {
    /// Mount a slider into the container `id` of `document`.
    ///
    /// `options` must already be resolved. Fails without touching the
    /// document when the mount point does not exist.
    pub fn mount(
        document: &mut Document,
        id: &str,
        images: Vec<ImageDescriptor>,
        options: SliderOptions,
    ) -> Result<Self, RenderError> {
        let container = document
            .take(id)
            .ok_or_else(|| RenderError::MissingMount(id.to_string()))?;

        let navigator: Box<dyn Navigator> = match options.layout {
            Layout::Slide => Box::new(SlideNavigator::new(images)),
            Layout::Grid => Box::new(PageNavigator::new(images)),
        };
        let image_count = navigator.images().len();

        let mut slider = Self {
            container,
            autoplay: Autoplay::from_options(&options),
            lightbox: Lightbox::new(image_count),
            bindings: bindings_for(&options, image_count),
            options,
            navigator,
            hovered: false,
            touch_start: None,
        };
        slider.start_autoplay();
        slider.render();
        log::debug!(
            "mounted slider '{}' ({} images, {} layout)",
            id,
            image_count,
            slider.options.layout.as_str()
        );
        Ok(slider)
    }

    /// Tear down and return the container to `document`, emptied.
    pub fn destroy(mut self, document: &mut Document) {
        self.autoplay.pause();
        self.bindings.clear();
        self.navigator.events_mut().clear();
        self.lightbox.events_mut().clear();
        self.container.html.clear();
        log::debug!("destroyed slider '{}'", self.container.id);
        document.restore(self.container);
    }

    /// Replace the images: cancel the pending interval, reset, re-render,
    /// and restart autoplay.
    pub fn update_items(&mut self, images: Vec<ImageDescriptor>) {
        self.autoplay.pause();
        self.touch_start = None;
        self.navigator.update_items(images);
        let image_count = self.navigator.images().len();
        self.lightbox.set_len(image_count);
        self.bindings = bindings_for(&self.options, image_count);
        self.start_autoplay();
        self.render();
    }

    /// Handle one input. Returns whether a registered binding consumed it.
    pub fn dispatch(&mut self, input: Input) -> bool {
        let handled = match input {
            Input::Click(target) => self.click(target),
            Input::Key(key) => self.key(key),
            Input::TouchStart { x } if self.is_bound(Binding::Touch) => {
                self.touch_start = Some(x);
                self.autoplay.pause();
                true
            }
            Input::TouchEnd { x } if self.is_bound(Binding::Touch) => {
                let Some(start) = self.touch_start.take() else {
                    return false;
                };
                let travel = start - x;
                if travel.abs() > SWIPE_THRESHOLD {
                    if travel > 0.0 {
                        self.navigator.next();
                    } else {
                        self.navigator.previous();
                    }
                }
                self.start_autoplay();
                true
            }
            Input::PointerEnter if self.is_bound(Binding::Hover) => {
                self.hovered = true;
                self.autoplay.pause();
                true
            }
            Input::PointerLeave if self.is_bound(Binding::Hover) => {
                self.hovered = false;
                self.start_autoplay();
                true
            }
            _ => false,
        };
        if handled {
            self.render();
        }
        handled
    }

    /// Let `elapsed` pass. Returns the number of automatic advances.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        let ticks = self.autoplay.advance(elapsed);
        // Navigation is cyclic: whole laps land back where they started.
        let steps = match self.navigator.len() {
            0 => 0,
            n => ticks as usize % n,
        };
        for _ in 0..steps {
            self.navigator.next();
        }
        if ticks > 0 {
            self.render();
        }
        ticks
    }

    fn click(&mut self, target: Target) -> bool {
        match target {
            Target::Prev if self.is_bound(Binding::Navigation) => self.navigator.previous(),
            Target::Next if self.is_bound(Binding::Navigation) => self.navigator.next(),
            Target::Indicator(i) if self.is_bound(Binding::Indicators) => self.navigator.go_to(i),
            Target::Image(i) if self.is_bound(Binding::Lightbox) => match self.lightbox.open(i) {
                Ok(()) => true,
                Err(e) => {
                    log::debug!("ignoring click: {e}");
                    false
                }
            },
            Target::LightboxClose | Target::LightboxBackdrop if self.lightbox_active() => {
                self.lightbox.close();
                true
            }
            Target::LightboxPrev if self.lightbox_active() => self.lightbox.previous(),
            Target::LightboxNext if self.lightbox_active() => self.lightbox.next(),
            _ => false,
        }
    }

    fn key(&mut self, key: Key) -> bool {
        if self.lightbox_active() {
            match key {
                Key::Escape => {
                    self.lightbox.close();
                    return true;
                }
                Key::ArrowLeft => return self.lightbox.previous(),
                Key::ArrowRight => return self.lightbox.next(),
                _ => {}
            }
        }
        if !self.is_bound(Binding::Keyboard) || !self.hovered {
            return false;
        }
        match key {
            Key::ArrowLeft => self.navigator.previous(),
            Key::ArrowRight => self.navigator.next(),
            Key::Space => {
                self.autoplay.toggle(self.navigator.len());
                true
            }
            Key::Escape | Key::Other => false,
        }
    }

    fn lightbox_active(&self) -> bool {
        self.is_bound(Binding::Lightbox) && self.lightbox.is_open()
    }

    fn is_bound(&self, binding: Binding) -> bool {
        self.bindings.contains(&binding)
    }

    fn start_autoplay(&mut self) {
        let positions = self.navigator.len();
        self.autoplay.start(positions);
    }

    fn render(&mut self) {
        self.container.html = self.markup().into_string();
    }

    fn markup(&self) -> Markup {
        let images = self.navigator.images();
        if images.is_empty() {
            return html! { div.slider-empty { "No images to display" } };
        }

        let grid = self.options.layout == Layout::Grid;
        let total = self.navigator.len();
        let current = self.navigator.current().unwrap_or(0);
        let unit = if grid { "page" } else { "slide" };
        let track_style = format!("transform: translateX(-{}%)", current * 100);
        let autoplay_state = if self.autoplay.is_running() { "running" } else { "paused" };
        let lightbox_image = self.lightbox.current().and_then(|i| images.get(i));

        html! {
            div.slider-root
                data-layout=(self.options.layout.as_str())
                data-total=(total)
                data-current=(current)
                data-autoplay=(autoplay_state)
                data-lightbox=[self.lightbox.current()]
            {
                div.slider-viewport {
                    div.slider-track style=(track_style) {
                        @if grid {
                            @for (p, page) in paginate(images).into_iter().enumerate() {
                                div.slider-page data-page=(p) {
                                    @for (slot, image) in page.iter().enumerate() {
                                        div.slider-cell { (image_tag(image, p * PAGE_SIZE + slot)) }
                                    }
                                }
                            }
                        } @else {
                            @for (i, image) in images.iter().enumerate() {
                                div.slider-slide data-index=(i) { (image_tag(image, i)) }
                            }
                        }
                    }
                    @if self.options.show_navigation {
                        button.slider-nav.slider-prev type="button" aria-label="Previous" disabled[total <= 1] { "‹" }
                        button.slider-nav.slider-next type="button" aria-label="Next" disabled[total <= 1] { "›" }
                    }
                }
                @if self.options.show_indicators {
                    div.slider-indicators {
                        @for i in 0..total {
                            button.slider-indicator.active[i == current]
                                type="button"
                                aria-label=(format!("Go to {unit} {}", i + 1))
                                data-index=(i) {}
                        }
                    }
                }
                @if self.options.lightbox {
                    div.slider-lightbox.active[lightbox_image.is_some()]
                        hidden[lightbox_image.is_none()]
                    {
                        button.lightbox-close type="button" aria-label="Close" { "×" }
                        button.lightbox-prev type="button" aria-label="Previous image" { "‹" }
                        img.lightbox-image
                            src=[lightbox_image.map(|i| i.src.as_str())]
                            alt=[lightbox_image.map(|i| i.display_name())];
                        button.lightbox-next type="button" aria-label="Next image" { "›" }
                        div.lightbox-caption {
                            @if let Some(image) = lightbox_image { (image.display_name()) }
                        }
                    }
                }
            }
        }
    }

    // -------------------------------------------------------------------------
    // View state
    // -------------------------------------------------------------------------

    pub fn id(&self) -> &str {
        &self.container.id
    }

    /// Current rendered markup of the container.
    pub fn html(&self) -> &str {
        &self.container.html
    }

    pub fn options(&self) -> &SliderOptions {
        &self.options
    }

    /// Current slide (slide layout) or page (grid layout).
    pub fn current(&self) -> Option<usize> {
        self.navigator.current()
    }

    /// Number of slides or pages.
    pub fn position_count(&self) -> usize {
        self.navigator.len()
    }

    pub fn images(&self) -> &[ImageDescriptor] {
        self.navigator.images()
    }

    pub fn is_autoplay_running(&self) -> bool {
        self.autoplay.is_running()
    }

    pub fn time_until_advance(&self) -> Option<Duration> {
        self.autoplay.time_until_next()
    }

    /// Image shown in the lightbox, `None` while closed.
    pub fn lightbox_index(&self) -> Option<usize> {
        self.lightbox.current()
    }

    /// The page body must not scroll while the lightbox is open.
    pub fn body_scroll_locked(&self) -> bool {
        self.lightbox.is_open()
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Subscribe here to learn about slide or page changes.
    pub fn events_mut(&mut self) -> &mut EventBus<NavigatorEvent> {
        self.navigator.events_mut()
    }

    pub fn lightbox_events_mut(&mut self) -> &mut EventBus<LightboxEvent> {
        self.lightbox.events_mut()
    }
}

fn image_tag(image: &ImageDescriptor, index: usize) -> Markup {
    html! {
        img.slider-image src=(image.src) alt=(image.display_name()) loading="lazy" data-index=(index);
    }
}
