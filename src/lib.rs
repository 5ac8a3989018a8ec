//! # Slide Embed
//!
//! An image slider you can paste anywhere. Give it a list of images and a set
//! of options and it produces a self-contained block of HTML, CSS and
//! JavaScript that renders a slider on any page, with no build step and no
//! dependency on the host page's framework.
//!
//! # Architecture: One State Machine, Two Renderings
//!
//! The slider's behavior is defined once, as plain Rust state machines, and
//! rendered two ways:
//!
//! ```text
//! images + options ─┬─→ live::LiveSlider     (in-process: navigator, autoplay, lightbox)
//!                   └─→ embed::EmbedGenerator (standalone artifact: static/slider.js)
//! ```
//!
//! The embedded runtime in `static/slider.js` follows the same rules as the
//! Rust types: cyclic navigation, nine-cell grid pages, autoplay that pauses
//! on hover and on touch, a lightbox that wraps around and locks page scroll.
//! The browser tests in `tests/` drive both with the same inputs and compare
//! the resulting position.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | Image descriptors, validation results, project records |
//! | [`config`] | Slider options: stock defaults per profile, layered overlays, validation, CSS custom properties |
//! | [`events`] | Typed publish/subscribe bus used by the navigator and the lightbox |
//! | [`navigator`] | Slide and page navigators: cyclic cursor plus change notifications |
//! | [`autoplay`] | Periodic advancement driven by elapsed time |
//! | [`lightbox`] | Full-screen viewer state |
//! | [`live`] | Mounts a slider into a document, binds inputs, re-renders markup |
//! | [`embed`] | Embed-code generators: standalone, lightweight, shortcode, React, project-bound |
//! | [`ingest`] | Turns an image directory into descriptors (dimensions, MIME type, optional data URIs) |
//! | [`output`] | CLI output formatting for reports and artifacts |
//!
//! # Design Decisions
//!
//! ## Maud For Markup
//!
//! The slider container, the live rendering and the preview page are built
//! with [Maud](https://maud.lambda.xyz/). Image names and sources come from
//! users, and Maud escapes every interpolation. Data embedded inside `<script>`
//! goes through a separate JSON encoder that escapes `<`, `>` and `&` so a
//! name like `</script>` cannot end the block early.
//!
//! ## Explicit Time
//!
//! [`autoplay::Autoplay`] never reads a clock. Callers hand it elapsed time
//! through [`live::LiveSlider::advance`], which makes timing deterministic
//! in tests and lets a host drive it from whatever timer it already has.
//!
//! ## Layered Options
//!
//! Options resolve from stock defaults through any number of JSON overlays:
//!
//! ```text
//! stock defaults (embed | preview | project)
//!   ← options file (TOML)
//!   ← --set key=value
//! ```
//!
//! Unknown keys are rejected at every layer, so a typo in `autoPlayDelay`
//! fails loudly instead of silently using the default.
//!
//! ## Teardown Consumes
//!
//! [`live::LiveSlider::destroy`] takes the slider by value. A destroyed slider
//! cannot be driven because it no longer exists.

pub mod autoplay;
pub mod config;
pub mod embed;
pub mod events;
pub mod ingest;
pub mod lightbox;
pub mod live;
pub mod navigator;
pub mod output;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
