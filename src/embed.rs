//! Embed code generation.
//!
//! Turns an image list plus sparse options into paste-able text that runs
//! the slider on any third-party page with no external dependencies.
//!
//! ## Artifact Layout
//!
//! ```text
//! <!-- Image Slider Embed v0.4.0 -->
//! <div id="slider_3f9c0a1b2c4d" class="image-slider-embed" data-layout="slide"></div>
//!
//! <style>
//! #slider_3f9c0a1b2c4d { --slider-width: 100%; ... }   per-instance options
//! .image-slider-embed ...                               static/slider.css
//! </style>
//!
//! <script>
//! (function () {
//!     var config = { "images": [...], "options": {...} };
//!     function mountSlider(container, config) { ... }   static/slider.js
//!     ... boot on DOMContentLoaded ...
//! })();
//! </script>
//! ```
//!
//! The runtime in `static/slider.js` restates the navigator, autoplay and
//! lightbox state machines; [`crate::live::LiveSlider`] is the in-process
//! projection of the same machines and the browser tests hold the two to
//! identical behavior.
//!
//! ## Variants
//!
//! - **Lightweight**: container with a `data-slider-config` attribute plus a
//!   CDN script tag.
//! - **WordPress shortcode**: `[image_slider images="..." key="value" ...]`.
//! - **React**: a function component whose effect runs the same script.
//! - **Dynamic**: inlines a project id instead of images and fetches the
//!   project at display time, degrading to an inline placeholder.
//!
//! Every variant carries the same resolved configuration, and
//! [`extract_config`] / [`parse_shortcode`] read it back.
//!
//! ## Escaping
//!
//! Markup goes through maud. Data inlined into `<script>` is JSON with `<`,
//! `>`, `&`, U+2028 and U+2029 written as `\uXXXX`, so no image name or URL
//! can close the script element.

use crate::config::{self, ConfigError, DefaultsProfile, SliderOptions};
use crate::types::{ImageDescriptor, ImageValidation, Project, unique_digest};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

const SLIDER_CSS: &str = include_str!("../static/slider.css");
const SLIDER_JS: &str = include_str!("../static/slider.js");
const DYNAMIC_JS: &str = include_str!("../static/dynamic.js");

/// Version stamped into generated artifacts.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_CDN_BASE: &str = "https://cdn.jsdelivr.net/npm/slide-embed@latest/dist";
pub const DEFAULT_API_BASE: &str = "https://api.slide-embed.dev";

/// Fixed container id used by the React component.
pub const REACT_SLIDER_ID: &str = "react-slider";

const CONFIG_MARKER: &str = "var config = ";
const OPTIONS_MARKER: &str = "var options = ";
const ATTR_MARKER: &str = "data-slider-config=\"";
const SHORTCODE_TAG: &str = "image_slider";

#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("{0}")]
    Validation(String),
    #[error("invalid options: {0}")]
    Config(#[from] ConfigError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One image as it appears in the embedded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedImage {
    pub src: String,
    pub name: String,
}

/// The configuration every artifact embeds: images plus resolved options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmbedConfig {
    pub images: Vec<EmbedImage>,
    pub options: SliderOptions,
}

// =============================================================================
// Slider ids
// =============================================================================

/// DOM id of a generated container.
///
/// Always starts with an ASCII letter and contains only `[A-Za-z0-9_-]`, so
/// it is safe as a CSS selector and as an HTML attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SliderId(String);

impl SliderId {
    /// `slider_<12 hex>`, unique within the process.
    pub fn generate() -> Self {
        let digest = unique_digest("slider");
        Self(format!("slider_{}", &digest[..12]))
    }

    pub fn parse(id: &str) -> Result<Self, EmbedError> {
        let mut chars = id.chars();
        let valid_start = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
        let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if valid_start && valid_rest {
            Ok(Self(id.to_string()))
        } else {
            Err(EmbedError::Validation(format!("invalid slider id {id:?}")))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SliderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Check that there is at least one image and every image has a source.
pub fn validate_images(images: &[ImageDescriptor]) -> ImageValidation {
    if images.is_empty() {
        return ImageValidation::invalid("Images array is required and cannot be empty");
    }
    match images.iter().position(|img| img.src.trim().is_empty()) {
        Some(i) => ImageValidation::invalid(format!("Image at index {i} missing src property")),
        None => ImageValidation::ok(),
    }
}

// =============================================================================
// Generator
// =============================================================================

#[derive(Debug, Clone)]
pub struct EmbedGenerator {
    cdn_base: String,
    api_base: String,
}

impl Default for EmbedGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl EmbedGenerator {
    pub fn new() -> Self {
        Self {
            cdn_base: DEFAULT_CDN_BASE.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    pub fn with_cdn_base(mut self, url: &str) -> Self {
        self.cdn_base = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_base(mut self, url: &str) -> Self {
        self.api_base = url.trim_end_matches('/').to_string();
        self
    }

    pub fn validate_images(&self, images: &[ImageDescriptor]) -> ImageValidation {
        validate_images(images)
    }

    /// Validate the images and resolve `overrides` against the embed defaults.
    pub fn prepare_config(
        &self,
        images: &[ImageDescriptor],
        overrides: Option<&Value>,
    ) -> Result<EmbedConfig, EmbedError> {
        let validation = validate_images(images);
        if let Some(error) = validation.error {
            return Err(EmbedError::Validation(error));
        }
        let options = SliderOptions::resolve(DefaultsProfile::Embed, overrides)?;
        let images = images
            .iter()
            .map(|img| EmbedImage {
                src: img.src.clone(),
                name: img.display_name().to_string(),
            })
            .collect();
        Ok(EmbedConfig { images, options })
    }

    /// Full standalone embed with a fresh slider id.
    pub fn generate(
        &self,
        images: &[ImageDescriptor],
        overrides: Option<&Value>,
    ) -> Result<String, EmbedError> {
        self.generate_with_id(images, overrides, &SliderId::generate())
    }

    pub fn generate_with_id(
        &self,
        images: &[ImageDescriptor],
        overrides: Option<&Value>,
        id: &SliderId,
    ) -> Result<String, EmbedError> {
        let config = self.prepare_config(images, overrides)?;
        let css = self.generate_css(id, &config.options);
        let js = self.generate_javascript(id, &config)?;
        log::info!(
            "generated embed {} ({} images, {} layout)",
            id,
            config.images.len(),
            config.options.layout.as_str()
        );
        Ok(artifact(
            &format!("Image Slider Embed v{VERSION}"),
            container(id, &config.options, None),
            &css,
            &js,
        ))
    }

    /// Per-instance custom properties followed by the shared stylesheet.
    pub fn generate_css(&self, id: &SliderId, options: &SliderOptions) -> String {
        format!(
            "{}\n\n{}",
            config::generate_options_css(&format!("#{id}"), options),
            SLIDER_CSS.trim_end()
        )
    }

    /// Self-invoking script: embedded configuration, runtime, boot.
    pub fn generate_javascript(
        &self,
        id: &SliderId,
        config: &EmbedConfig,
    ) -> Result<String, EmbedError> {
        let boot = format!(
            r#"    function boot() {{
        var container = document.getElementById({id});
        if (!container) return;
        mountSlider(container, config);
    }}"#,
            id = script_json(&id.as_str(), false)?,
        );
        Ok(iife(
            &format!("{CONFIG_MARKER}{};", script_json(config, true)?),
            &[SLIDER_JS],
            &boot,
        ))
    }

    /// Container carrying the configuration as an attribute plus the hosted
    /// runtime script.
    pub fn generate_lightweight(
        &self,
        images: &[ImageDescriptor],
        overrides: Option<&Value>,
    ) -> Result<String, EmbedError> {
        let config = self.prepare_config(images, overrides)?;
        let id = SliderId::generate();
        let json = serde_json::to_string(&config)?;
        let script_src = format!("{}/slider-embed.min.js", self.cdn_base);
        let markup = html! {
            (PreEscaped("<!-- Lightweight Image Slider Embed -->\n"))
            div.image-slider-embed id=(id.as_str()) data-slider-config=(json) {}
            "\n"
            script src=(script_src) {}
        };
        Ok(markup.into_string())
    }

    /// `[image_slider images="..." names="..." key="value" ...]` listing every
    /// resolved option.
    pub fn generate_wordpress_shortcode(
        &self,
        images: &[ImageDescriptor],
        overrides: Option<&Value>,
    ) -> Result<String, EmbedError> {
        let config = self.prepare_config(images, overrides)?;
        let join = |items: Vec<&str>| {
            items
                .into_iter()
                .map(escape_shortcode_item)
                .collect::<Vec<_>>()
                .join(",")
        };
        let mut parts = vec![
            format!("[{SHORTCODE_TAG}"),
            format!(
                "images=\"{}\"",
                join(config.images.iter().map(|i| i.src.as_str()).collect())
            ),
            format!(
                "names=\"{}\"",
                join(config.images.iter().map(|i| i.name.as_str()).collect())
            ),
        ];
        if let Value::Object(options) = serde_json::to_value(&config.options)? {
            for (key, value) in options {
                let text = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                parts.push(format!("{key}=\"{}\"", escape_shortcode_item(&text)));
            }
        }
        Ok(format!("{}]", parts.join(" ")))
    }

    /// A React function component mounting the slider into `#react-slider`.
    pub fn generate_react_component(
        &self,
        images: &[ImageDescriptor],
        overrides: Option<&Value>,
    ) -> Result<String, EmbedError> {
        let config = self.prepare_config(images, overrides)?;
        let id = SliderId::parse(REACT_SLIDER_ID)?;
        let css = self.generate_css(&id, &config.options);
        let js = self.generate_javascript(&id, &config)?;
        let effect = indent(&js, "        ");
        let styles = script_json(&css, false)?;
        let layout = config.options.layout.as_str();
        Ok(format!(
            r#"import React, {{ useEffect }} from 'react';

const styles = {styles};

const ImageSlider = () => {{
    useEffect(() => {{
{effect}
    }}, []);

    return (
        <>
            <style>{{styles}}</style>
            <div id="{REACT_SLIDER_ID}" className="image-slider-embed" data-layout="{layout}"></div>
        </>
    );
}};

export default ImageSlider;
"#
        ))
    }

    /// Project-bound embed: fetches `{api_base}/projects/{id}` at display
    /// time and renders the images in grid layout.
    ///
    /// Options layer as project profile, grid layout, the project's stored
    /// settings, then `overrides`. Counts the embed on the project.
    pub fn generate_dynamic(
        &self,
        project: &mut Project,
        overrides: Option<&Value>,
    ) -> Result<String, EmbedError> {
        self.generate_dynamic_with_id(project, overrides, &SliderId::generate())
    }

    pub fn generate_dynamic_with_id(
        &self,
        project: &mut Project,
        overrides: Option<&Value>,
        id: &SliderId,
    ) -> Result<String, EmbedError> {
        validate_project_id(&project.id)?;
        let options = project_options(project, overrides)?;
        let css = self.generate_css(id, &options);

        let data = format!(
            "{OPTIONS_MARKER}{};\n    var projectId = {};\n    var apiBase = {};",
            script_json(&options, true)?,
            script_json(&project.id, false)?,
            script_json(&self.api_base, false)?,
        );
        let boot = format!(
            r#"    function boot() {{
        var container = document.getElementById({id});
        if (!container) return;
        loadProject(container, apiBase, projectId, options);
    }}"#,
            id = script_json(&id.as_str(), false)?,
        );
        let js = iife(&data, &[SLIDER_JS, DYNAMIC_JS], &boot);

        project.embed_count += 1;
        log::info!(
            "generated dynamic embed {} for project {} (embed #{})",
            id,
            project.id,
            project.embed_count
        );
        Ok(artifact(
            &format!("Image Slider Embed v{VERSION} (project {})", project.id),
            container(id, &options, Some(&project.id)),
            &css,
            &js,
        ))
    }

    /// Standalone HTML page around a fresh embed, for local previewing.
    pub fn preview_page(
        &self,
        images: &[ImageDescriptor],
        overrides: Option<&Value>,
    ) -> Result<String, EmbedError> {
        let embed = self.generate(images, overrides)?;
        let content = html! {
            main.preview {
                h1 { "Slider Preview" }
                p.preview-meta { (images.len()) " images" }
                (PreEscaped(embed))
            }
        };
        Ok(base_document("Slider Preview", content).into_string())
    }
}

/// Project ids end up in a comment, an attribute, a script literal and a
/// URL path; only `[A-Za-z0-9_-]` is accepted.
fn validate_project_id(id: &str) -> Result<(), EmbedError> {
    let safe = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if safe {
        Ok(())
    } else {
        Err(EmbedError::Validation(format!("invalid project id {id:?}")))
    }
}

fn project_options(project: &Project, overrides: Option<&Value>) -> Result<SliderOptions, EmbedError> {
    if !project.settings.is_object() && !project.settings.is_null() {
        return Err(EmbedError::Validation(format!(
            "project {} has malformed settings",
            project.id
        )));
    }
    let mut overlay = serde_json::json!({ "layout": "grid" });
    overlay = config::merge_json(overlay, project.settings.clone());
    if let Some(overrides) = overrides {
        overlay = config::merge_json(overlay, overrides.clone());
    }
    Ok(SliderOptions::resolve(DefaultsProfile::Project, Some(&overlay))?)
}

// =============================================================================
// Assembly
// =============================================================================

fn container(id: &SliderId, options: &SliderOptions, project_id: Option<&str>) -> Markup {
    html! {
        div.image-slider-embed
            id=(id.as_str())
            data-layout=(options.layout.as_str())
            data-project-id=[project_id] {}
    }
}

fn artifact(comment: &str, container: Markup, css: &str, js: &str) -> String {
    html! {
        (PreEscaped(format!("<!-- {comment} -->\n")))
        (container)
        "\n\n"
        style { "\n" (PreEscaped(css)) "\n" }
        "\n\n"
        script { "\n" (PreEscaped(js)) "\n" }
    }
    .into_string()
}

fn iife(data: &str, runtime: &[&str], boot: &str) -> String {
    let mut out = String::from("(function () {\n    'use strict';\n\n    ");
    out.push_str(data);
    out.push_str("\n\n");
    for part in runtime {
        out.push_str(&indent(part.trim_end(), "    "));
        out.push_str("\n\n");
    }
    out.push_str(boot);
    out.push_str(
        r#"

    if (document.readyState === 'loading') {
        document.addEventListener('DOMContentLoaded', boot);
    } else {
        boot();
    }
})();"#,
    );
    out
}

fn base_document(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { "body { margin: 0; padding: 2rem; background: #f3f4f6; font-family: sans-serif; }" }
            }
            body {
                (content)
            }
        }
    }
}

fn indent(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// JSON safe to inline in a `<script>` element.
fn script_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String, EmbedError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    Ok(out)
}

// =============================================================================
// Reading artifacts back
// =============================================================================

/// Parse the configuration embedded in a standalone, React or lightweight
/// artifact.
pub fn extract_config(artifact: &str) -> Result<EmbedConfig, EmbedError> {
    if let Some(pos) = artifact.find(CONFIG_MARKER) {
        return first_json(&artifact[pos + CONFIG_MARKER.len()..]);
    }
    if let Some(pos) = artifact.find(ATTR_MARKER) {
        let rest = &artifact[pos + ATTR_MARKER.len()..];
        let end = rest
            .find('"')
            .ok_or_else(|| EmbedError::Validation("unterminated data-slider-config".into()))?;
        return Ok(serde_json::from_str(&unescape_attribute(&rest[..end]))?);
    }
    Err(EmbedError::Validation(
        "no embedded slider configuration found".into(),
    ))
}

/// Parse the resolved options embedded in a dynamic artifact.
pub fn extract_options(artifact: &str) -> Result<SliderOptions, EmbedError> {
    let pos = artifact
        .find(OPTIONS_MARKER)
        .ok_or_else(|| EmbedError::Validation("no embedded slider options found".into()))?;
    first_json(&artifact[pos + OPTIONS_MARKER.len()..])
}

fn first_json<T: serde::de::DeserializeOwned>(text: &str) -> Result<T, EmbedError> {
    let mut stream = serde_json::Deserializer::from_str(text).into_iter::<T>();
    match stream.next() {
        Some(parsed) => Ok(parsed?),
        None => Err(EmbedError::Validation("embedded configuration is empty".into())),
    }
}

fn unescape_attribute(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

// =============================================================================
// Shortcode
// =============================================================================

fn escape_shortcode_item(item: &str) -> String {
    let mut out = String::with_capacity(item.len());
    for c in item.chars() {
        match c {
            '%' => out.push_str("%25"),
            ',' => out.push_str("%2C"),
            '"' => out.push_str("%22"),
            '[' => out.push_str("%5B"),
            ']' => out.push_str("%5D"),
            c => out.push(c),
        }
    }
    out
}

fn unescape_shortcode_item(item: &str) -> String {
    let mut out = String::with_capacity(item.len());
    let mut rest = item;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let code = rest.get(pos + 1..pos + 3);
        let decoded = match code {
            Some("25") => Some('%'),
            Some("2C") => Some(','),
            Some("22") => Some('"'),
            Some("5B") => Some('['),
            Some("5D") => Some(']'),
            _ => None,
        };
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &rest[pos + 3..];
            }
            None => {
                out.push('%');
                rest = &rest[pos + 1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Read a shortcode produced by
/// [`EmbedGenerator::generate_wordpress_shortcode`] back into a configuration.
///
/// Option values are typed by the stock defaults: `"false"` becomes a
/// boolean for `autoPlay`, `"2500"` a number for `autoPlayDelay`.
pub fn parse_shortcode(shortcode: &str) -> Result<EmbedConfig, EmbedError> {
    let body = shortcode
        .trim()
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .and_then(|s| s.strip_prefix(SHORTCODE_TAG))
        .filter(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
        .ok_or_else(|| EmbedError::Validation(format!("not an [{SHORTCODE_TAG}] shortcode")))?;

    let defaults = config::stock_defaults_value(DefaultsProfile::Embed)?;
    let mut srcs = Vec::new();
    let mut names = Vec::new();
    let mut overlay = serde_json::Map::new();

    for (key, raw) in shortcode_attributes(body)? {
        let split = || -> Vec<String> {
            if raw.is_empty() {
                Vec::new()
            } else {
                raw.split(',').map(unescape_shortcode_item).collect()
            }
        };
        match key {
            "images" => srcs = split(),
            "names" => names = split(),
            _ => {
                let text = unescape_shortcode_item(raw);
                let value = match defaults.get(key) {
                    Some(Value::Bool(_)) => Value::Bool(text.parse().map_err(|_| {
                        EmbedError::Validation(format!("{key} expects true or false, got {text:?}"))
                    })?),
                    Some(Value::Number(_)) => Value::from(text.parse::<u64>().map_err(|_| {
                        EmbedError::Validation(format!("{key} expects a number, got {text:?}"))
                    })?),
                    Some(_) => Value::String(text),
                    None => {
                        return Err(EmbedError::Validation(format!(
                            "unknown shortcode attribute {key:?}"
                        )));
                    }
                };
                overlay.insert(key.to_string(), value);
            }
        }
    }

    let images: Vec<ImageDescriptor> = srcs
        .into_iter()
        .enumerate()
        .map(|(i, src)| {
            let image = ImageDescriptor::new(src);
            match names.get(i) {
                Some(name) => image.with_name(name.clone()),
                None => image,
            }
        })
        .collect();
    EmbedGenerator::new().prepare_config(&images, Some(&Value::Object(overlay)))
}

fn shortcode_attributes(body: &str) -> Result<Vec<(&str, &str)>, EmbedError> {
    let mut attributes = Vec::new();
    let mut rest = body.trim_start();
    while !rest.is_empty() {
        let (key, after) = rest
            .split_once("=\"")
            .ok_or_else(|| EmbedError::Validation(format!("malformed shortcode near {rest:?}")))?;
        let (value, after) = after
            .split_once('"')
            .ok_or_else(|| EmbedError::Validation(format!("unterminated value for {key:?}")))?;
        attributes.push((key.trim(), value));
        rest = after.trim_start();
    }
    Ok(attributes)
}
