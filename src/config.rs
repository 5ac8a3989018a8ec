//! Slider options: defaults, layered merging, validation, and CSS generation.
//!
//! Every renderer works from a fully resolved [`SliderOptions`]. Callers
//! supply sparse overrides (a JSON object from an application layer, an
//! options file, or `--set` pairs on the CLI); those are merged onto the
//! stock defaults exactly once, at the generator or live-renderer boundary.
//!
//! ## Options File
//!
//! ```toml
//! # All options are optional - defaults shown below (embed profile)
//!
//! autoPlay = true             # Advance automatically
//! autoPlayDelay = 3000        # Milliseconds between advances
//! showIndicators = true       # Position dots under the slider
//! showNavigation = true       # Prev/next buttons
//! enableKeyboard = true       # Arrow keys while hovered, space toggles autoplay
//! enableTouch = true          # Swipe left/right
//! transitionDuration = 500    # Slide animation in milliseconds
//! width = "100%"
//! height = "400px"
//! borderRadius = "12px"
//! layout = "slide"            # "slide" (one image per view) or "grid" (3x3 pages)
//! lightbox = true             # Click an image to view it full size
//! ```
//!
//! Keys are camelCase so the options file, the CLI, and the configuration
//! embedded in generated code share one vocabulary. Unknown keys are
//! rejected to catch typos early.
//!
//! ## Defaults Profiles
//!
//! The auto-advance delay depends on where the slider runs: exported embeds
//! default to 3000 ms, the in-app preview and saved projects to 4000 ms.
//! See [`DefaultsProfile`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Options validation error: {0}")]
    Validation(String),
}

/// Shortest accepted auto-advance interval.
pub const MIN_AUTO_PLAY_DELAY: u64 = 100;

/// Longest accepted auto-advance interval. Browser timers treat anything
/// above `i32::MAX` ms as zero.
pub const MAX_AUTO_PLAY_DELAY: u64 = i32::MAX as u64;

/// Longest accepted slide animation.
pub const MAX_TRANSITION_DURATION: u64 = 10_000;

/// How images are arranged on the track.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// One image per view; indicators address slides.
    #[default]
    Slide,
    /// Pages of up to nine images in a 3x3 grid; indicators address pages.
    Grid,
}

impl Layout {
    pub fn as_str(self) -> &'static str {
        match self {
            Layout::Slide => "slide",
            Layout::Grid => "grid",
        }
    }
}

/// Which context the defaults are drawn for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DefaultsProfile {
    /// Exported embed code.
    #[default]
    Embed,
    /// Live preview inside the application.
    Preview,
    /// Settings stored with a saved project.
    Project,
}

/// Fully resolved slider options.
///
/// Deserialization requires every key: a value of this type is always the
/// product of [`resolve_options`] (or of a configuration that was resolved
/// before it was serialized).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct SliderOptions {
    pub auto_play: bool,
    /// Milliseconds between automatic advances.
    pub auto_play_delay: u64,
    pub show_indicators: bool,
    pub show_navigation: bool,
    pub enable_keyboard: bool,
    pub enable_touch: bool,
    /// Slide animation time in milliseconds.
    pub transition_duration: u64,
    /// CSS length for the slider width.
    pub width: String,
    /// CSS length for the slide viewport height (slide layout only).
    pub height: String,
    pub border_radius: String,
    pub layout: Layout,
    /// Whether clicking an image opens the full-size viewer.
    pub lightbox: bool,
}

impl SliderOptions {
    /// Stock defaults for a profile.
    pub fn defaults(profile: DefaultsProfile) -> Self {
        let auto_play_delay = match profile {
            DefaultsProfile::Embed => 3000,
            DefaultsProfile::Preview | DefaultsProfile::Project => 4000,
        };
        Self {
            auto_play: true,
            auto_play_delay,
            show_indicators: true,
            show_navigation: true,
            enable_keyboard: true,
            enable_touch: true,
            transition_duration: 500,
            width: "100%".to_string(),
            height: "400px".to_string(),
            border_radius: "12px".to_string(),
            layout: Layout::Slide,
            lightbox: true,
        }
    }

    /// Merge a sparse overlay onto the profile defaults and validate.
    pub fn resolve(profile: DefaultsProfile, overlay: Option<&Value>) -> Result<Self, ConfigError> {
        resolve_options(profile, overlay)
    }

    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auto_play_delay < MIN_AUTO_PLAY_DELAY {
            return Err(ConfigError::Validation(format!(
                "autoPlayDelay must be at least {MIN_AUTO_PLAY_DELAY} ms"
            )));
        }
        if self.auto_play_delay > MAX_AUTO_PLAY_DELAY {
            return Err(ConfigError::Validation(format!(
                "autoPlayDelay must be at most {MAX_AUTO_PLAY_DELAY} ms"
            )));
        }
        if self.transition_duration > MAX_TRANSITION_DURATION {
            return Err(ConfigError::Validation(format!(
                "transitionDuration must be at most {MAX_TRANSITION_DURATION} ms"
            )));
        }
        for (key, value) in [
            ("width", &self.width),
            ("height", &self.height),
            ("borderRadius", &self.border_radius),
        ] {
            validate_css_value(key, value)?;
        }
        Ok(())
    }
}

impl Default for SliderOptions {
    fn default() -> Self {
        Self::defaults(DefaultsProfile::Embed)
    }
}

/// CSS lengths are interpolated into a style block; anything that could end
/// the declaration or the block is refused.
fn validate_css_value(key: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{key} must not be empty")));
    }
    if let Some(c) = value
        .chars()
        .find(|c| matches!(c, ';' | '{' | '}' | '<' | '>' | '"' | '\'' | '\\'))
    {
        return Err(ConfigError::Validation(format!(
            "{key} contains forbidden character {c:?}"
        )));
    }
    Ok(())
}

// =============================================================================
// Merging and loading
// =============================================================================

/// Stock defaults for a profile as a JSON object, the base layer for merging.
pub fn stock_defaults_value(profile: DefaultsProfile) -> Result<Value, ConfigError> {
    Ok(serde_json::to_value(SliderOptions::defaults(profile))?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Objects are merged key-by-key (overlay keys override base keys).
/// - `null` in the overlay means "not set" and keeps the base value.
/// - Other overlay values replace base values entirely.
pub fn merge_json(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_val) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_val) => merge_json(base_val, overlay_val),
                    None => overlay_val,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the profile defaults, then deserialize and
/// validate.
pub fn resolve_options(
    profile: DefaultsProfile,
    overlay: Option<&Value>,
) -> Result<SliderOptions, ConfigError> {
    let base = stock_defaults_value(profile)?;
    let merged = match overlay {
        None | Some(Value::Null) => base,
        Some(ov) if ov.is_object() => merge_json(base, ov.clone()),
        Some(other) => {
            return Err(ConfigError::Validation(format!(
                "options must be an object, got {other}"
            )));
        }
    };
    let options: SliderOptions = serde_json::from_value(merged)?;
    options.validate()?;
    Ok(options)
}

/// Load a sparse options overlay from a TOML file.
pub fn load_overlay(path: &Path) -> Result<Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(serde_json::to_value(value)?)
}

/// Parse a `key=value` pair from the command line.
///
/// The value is read as JSON when it parses (`true`, `2500`, `"x"`),
/// otherwise taken as a plain string (`400px`, `grid`).
pub fn parse_assignment(pair: &str) -> Result<(String, Value), ConfigError> {
    let (key, raw) = pair
        .split_once('=')
        .ok_or_else(|| ConfigError::Validation(format!("expected key=value, got {pair:?}")))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(ConfigError::Validation(format!("missing key in {pair:?}")));
    }
    let raw = raw.trim();
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

/// Build one overlay from an optional options file and `key=value` pairs.
/// Pairs win over the file.
pub fn build_overlay(file: Option<&Path>, pairs: &[String]) -> Result<Value, ConfigError> {
    let mut overlay = match file {
        Some(path) => load_overlay(path)?,
        None => Value::Object(Default::default()),
    };
    for pair in pairs {
        let (key, value) = parse_assignment(pair)?;
        let mut layer = serde_json::Map::new();
        layer.insert(key, value);
        overlay = merge_json(overlay, Value::Object(layer));
    }
    Ok(overlay)
}

/// Returns a fully-commented stock options file with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_options_toml() -> &'static str {
    r##"# Slide Embed Options
# ===================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults for exported embeds.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Behavior
# ---------------------------------------------------------------------------
# Advance to the next slide automatically. Pauses while the pointer is over
# the slider or a finger is on it.
autoPlay = true

# Milliseconds between automatic advances (minimum 100).
autoPlayDelay = 3000

# Arrow keys navigate while the pointer is over the slider; space toggles
# autoplay.
enableKeyboard = true

# Swipe left/right to navigate.
enableTouch = true

# Click an image to open it full size.
lightbox = true

# ---------------------------------------------------------------------------
# Controls
# ---------------------------------------------------------------------------
showIndicators = true
showNavigation = true

# ---------------------------------------------------------------------------
# Presentation
# ---------------------------------------------------------------------------
# "slide" shows one image at a time; "grid" shows pages of up to 9 images.
layout = "slide"

# Slide animation in milliseconds (maximum 10000).
transitionDuration = 500

# CSS lengths.
width = "100%"
height = "400px"
borderRadius = "12px"
"##
}

/// Generate the per-instance CSS custom properties for a slider.
///
/// `selector` scopes the block, normally `#<slider id>`.
pub fn generate_options_css(selector: &str, options: &SliderOptions) -> String {
    format!(
        r#"{selector} {{
    --slider-width: {width};
    --slider-height: {height};
    --slider-radius: {radius};
    --slider-transition: {transition}ms;
}}"#,
        width = options.width,
        height = options.height,
        radius = options.border_radius,
        transition = options.transition_duration,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn embed_defaults() {
        let o = SliderOptions::default();
        assert!(o.auto_play);
        assert_eq!(o.auto_play_delay, 3000);
        assert_eq!(o.transition_duration, 500);
        assert_eq!(o.width, "100%");
        assert_eq!(o.height, "400px");
        assert_eq!(o.border_radius, "12px");
        assert_eq!(o.layout, Layout::Slide);
        assert!(o.lightbox);
    }

    #[test]
    fn preview_and_project_profiles_slow_down_autoplay() {
        assert_eq!(
            SliderOptions::defaults(DefaultsProfile::Preview).auto_play_delay,
            4000
        );
        assert_eq!(
            SliderOptions::defaults(DefaultsProfile::Project).auto_play_delay,
            4000
        );
    }

    #[test]
    fn resolve_without_overlay_is_defaults() {
        let o = resolve_options(DefaultsProfile::Embed, None).unwrap();
        assert_eq!(o, SliderOptions::default());
    }

    #[test]
    fn resolve_partial_overlay() {
        let overlay = json!({ "autoPlay": false, "height": "300px" });
        let o = resolve_options(DefaultsProfile::Embed, Some(&overlay)).unwrap();
        assert!(!o.auto_play);
        assert_eq!(o.height, "300px");
        // Untouched keys keep their defaults
        assert_eq!(o.auto_play_delay, 3000);
        assert!(o.show_indicators);
    }

    #[test]
    fn resolve_treats_null_as_unset() {
        let overlay = json!({ "autoPlayDelay": null });
        let o = resolve_options(DefaultsProfile::Preview, Some(&overlay)).unwrap();
        assert_eq!(o.auto_play_delay, 4000);
    }

    #[test]
    fn resolve_rejects_unknown_keys() {
        let overlay = json!({ "autoplay": false });
        let result = resolve_options(DefaultsProfile::Embed, Some(&overlay));
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn resolve_rejects_non_object() {
        let overlay = json!([1, 2]);
        let result = resolve_options(DefaultsProfile::Embed, Some(&overlay));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn resolve_rejects_wrong_types() {
        let overlay = json!({ "autoPlayDelay": "fast" });
        assert!(resolve_options(DefaultsProfile::Embed, Some(&overlay)).is_err());
    }

    #[test]
    fn validate_rejects_tiny_delay() {
        let o = SliderOptions {
            auto_play_delay: 10,
            ..SliderOptions::default()
        };
        assert!(matches!(o.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_long_transition() {
        let o = SliderOptions {
            transition_duration: 60_000,
            ..SliderOptions::default()
        };
        assert!(o.validate().is_err());
    }

    #[test]
    fn validate_rejects_delay_beyond_browser_timers() {
        let o = SliderOptions {
            auto_play_delay: MAX_AUTO_PLAY_DELAY + 1,
            ..SliderOptions::default()
        };
        assert!(o.validate().is_err());

        let o = SliderOptions {
            auto_play_delay: MAX_AUTO_PLAY_DELAY,
            ..SliderOptions::default()
        };
        assert!(o.validate().is_ok());

        let overlay = json!({ "autoPlayDelay": 3_000_000_000u64 });
        assert!(matches!(
            SliderOptions::resolve(DefaultsProfile::Embed, Some(&overlay)),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn validate_rejects_css_breakout() {
        let o = SliderOptions {
            height: "1px; } body { display: none".to_string(),
            ..SliderOptions::default()
        };
        let err = o.validate().unwrap_err().to_string();
        assert!(err.contains("height"), "{err}");
    }

    #[test]
    fn validate_rejects_empty_css_value() {
        let o = SliderOptions {
            width: " ".to_string(),
            ..SliderOptions::default()
        };
        assert!(o.validate().is_err());
    }

    #[test]
    fn merge_json_nested() {
        let base = json!({ "a": { "x": 1, "y": 2 }, "b": 3 });
        let overlay = json!({ "a": { "y": 20 }, "c": 4 });
        let merged = merge_json(base, overlay);
        assert_eq!(merged, json!({ "a": { "x": 1, "y": 20 }, "b": 3, "c": 4 }));
    }

    #[test]
    fn options_serialize_camel_case() {
        let value = serde_json::to_value(SliderOptions::default()).unwrap();
        assert_eq!(value["autoPlay"], true);
        assert_eq!(value["autoPlayDelay"], 3000);
        assert_eq!(value["borderRadius"], "12px");
        assert_eq!(value["layout"], "slide");
    }

    #[test]
    fn resolved_options_require_every_key() {
        let partial = json!({ "autoPlay": false });
        assert!(serde_json::from_value::<SliderOptions>(partial).is_err());
    }

    #[test]
    fn parse_assignment_types() {
        assert_eq!(
            parse_assignment("autoPlay=false").unwrap(),
            ("autoPlay".to_string(), json!(false))
        );
        assert_eq!(
            parse_assignment("autoPlayDelay=2500").unwrap(),
            ("autoPlayDelay".to_string(), json!(2500))
        );
        assert_eq!(
            parse_assignment("height = 300px").unwrap(),
            ("height".to_string(), json!("300px"))
        );
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=1").is_err());
    }

    #[test]
    fn load_overlay_reads_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("slider.toml");
        fs::write(&path, "autoPlay = false\nlayout = \"grid\"\n").unwrap();

        let overlay = load_overlay(&path).unwrap();
        let o = resolve_options(DefaultsProfile::Embed, Some(&overlay)).unwrap();
        assert!(!o.auto_play);
        assert_eq!(o.layout, Layout::Grid);
    }

    #[test]
    fn load_overlay_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("slider.toml");
        fs::write(&path, "this is not valid toml [[[").unwrap();
        assert!(matches!(load_overlay(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn build_overlay_pairs_override_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("slider.toml");
        fs::write(&path, "autoPlayDelay = 5000\nheight = \"200px\"\n").unwrap();

        let overlay = build_overlay(Some(&path), &["autoPlayDelay=1500".to_string()]).unwrap();
        let o = resolve_options(DefaultsProfile::Embed, Some(&overlay)).unwrap();
        assert_eq!(o.auto_play_delay, 1500);
        assert_eq!(o.height, "200px");
    }

    #[test]
    fn stock_options_toml_resolves_to_defaults() {
        let value: toml::Value = toml::from_str(stock_options_toml()).unwrap();
        let overlay = serde_json::to_value(value).unwrap();
        let o = resolve_options(DefaultsProfile::Embed, Some(&overlay)).unwrap();
        assert_eq!(o, SliderOptions::default());
    }

    #[test]
    fn options_css_includes_all_variables() {
        let css = generate_options_css("#slider_1", &SliderOptions::default());
        assert!(css.starts_with("#slider_1 {"));
        assert!(css.contains("--slider-width: 100%;"));
        assert!(css.contains("--slider-height: 400px;"));
        assert!(css.contains("--slider-radius: 12px;"));
        assert!(css.contains("--slider-transition: 500ms;"));
    }
}
