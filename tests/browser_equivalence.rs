//! Browser equivalence tests: the generated runtime and `LiveSlider` must
//! reach the same state for the same inputs.
//!
//! Each test writes a generated artifact into a page, loads it in headless
//! Chrome, replays a list of inputs as DOM events, and after every step
//! compares the page's `data-current` / `data-lightbox` / `data-autoplay`
//! attributes and body scroll lock with the live slider driven by the same
//! input.
//!
//! Autoplay is disabled in the generated configuration so wall-clock timers
//! cannot race the comparison. Autoplay state tests keep it enabled with a
//! delay long enough that no interval fires during the run.
//!
//! Run with: `cargo test --test browser_equivalence -- --ignored`

use headless_chrome::{Browser, LaunchOptions, Tab};
use serde_json::{Value, json};
use slide_embed::embed::{self, EmbedGenerator, SliderId};
use slide_embed::live::{Document, Input, Key, LiveSlider, Target};
use slide_embed::types::ImageDescriptor;
use std::sync::{Arc, OnceLock};
use tempfile::TempDir;

const MOUNT: &str = "slider_equivalence";

// ---------------------------------------------------------------------------
// Setup helpers
// ---------------------------------------------------------------------------

fn browser() -> &'static Browser {
    static B: OnceLock<Browser> = OnceLock::new();
    B.get_or_init(|| {
        Browser::new(LaunchOptions {
            window_size: Some((1280, 800)),
            ..Default::default()
        })
        .expect("failed to launch Chrome")
    })
}

fn images(n: usize) -> Vec<ImageDescriptor> {
    // Sources need not exist: only the slider state is compared.
    (0..n)
        .map(|i| ImageDescriptor::new(format!("frame-{i}.png")).with_name(format!("Frame {i}")))
        .collect()
}

/// A page holding one generated slider, plus the live slider built from the
/// configuration the artifact carries.
struct Pair {
    tab: Arc<Tab>,
    live: LiveSlider,
    _dir: TempDir,
}

fn load_pair(count: usize, overrides: Value) -> Pair {
    let mut overrides = overrides;
    overrides["autoPlay"] = json!(false);
    mount_pair(count, overrides)
}

/// Autoplay on, with a ten minute delay so only inputs change its state.
fn load_autoplay_pair(count: usize, overrides: Value) -> Pair {
    let mut overrides = overrides;
    overrides["autoPlay"] = json!(true);
    overrides["autoPlayDelay"] = json!(600_000);
    mount_pair(count, overrides)
}

fn mount_pair(count: usize, overrides: Value) -> Pair {
    let id = SliderId::parse(MOUNT).unwrap();
    let artifact = EmbedGenerator::new()
        .generate_with_id(&images(count), Some(&overrides), &id)
        .unwrap();

    let dir = TempDir::new().unwrap();
    let file = dir.path().join("index.html");
    std::fs::write(
        &file,
        format!("<!DOCTYPE html><html><head><meta charset=\"UTF-8\"></head><body>{artifact}</body></html>"),
    )
    .unwrap();

    let tab = browser().new_tab().unwrap();
    tab.navigate_to(&format!("file://{}", file.display()))
        .unwrap()
        .wait_until_navigated()
        .unwrap();
    tab.wait_for_element(".slider-root").unwrap();

    let config = embed::extract_config(&artifact).unwrap();
    let descriptors = config
        .images
        .iter()
        .map(|img| ImageDescriptor::new(img.src.clone()).with_name(img.name.clone()))
        .collect();
    let mut document = Document::new();
    document.add_mount(MOUNT);
    let live = LiveSlider::mount(&mut document, MOUNT, descriptors, config.options).unwrap();

    Pair {
        tab,
        live,
        _dir: dir,
    }
}

/// The DOM event sequence equivalent to one input.
fn script_for(input: Input) -> String {
    let click = |selector: &str| {
        format!("document.querySelector('#{MOUNT} {selector}').click()")
    };
    let key = |name: &str| {
        format!("document.dispatchEvent(new KeyboardEvent('keydown', {{ key: '{name}', bubbles: true }}))")
    };
    let touch = |kind: &str, x: f64| {
        format!(
            "(function () {{
                var viewport = document.querySelector('#{MOUNT} .slider-viewport');
                var t = new Touch({{ identifier: 1, target: viewport, screenX: {x}, clientX: {x} }});
                viewport.dispatchEvent(new TouchEvent('{kind}', {{ changedTouches: [t], touches: [t], bubbles: true }}));
            }})()"
        )
    };
    let pointer = |kind: &str| {
        format!("document.querySelector('#{MOUNT} .slider-root').dispatchEvent(new MouseEvent('{kind}'))")
    };
    match input {
        Input::Click(Target::Prev) => click(".slider-prev"),
        Input::Click(Target::Next) => click(".slider-next"),
        Input::Click(Target::Indicator(i)) => format!(
            "document.querySelectorAll('#{MOUNT} .slider-indicator')[{i}].click()"
        ),
        Input::Click(Target::Image(i)) => click(&format!(".slider-image[data-index=\"{i}\"]")),
        Input::Click(Target::LightboxClose) => click(".lightbox-close"),
        Input::Click(Target::LightboxPrev) => click(".lightbox-prev"),
        Input::Click(Target::LightboxNext) => click(".lightbox-next"),
        Input::Click(Target::LightboxBackdrop) => click(".slider-lightbox"),
        Input::Key(Key::ArrowLeft) => key("ArrowLeft"),
        Input::Key(Key::ArrowRight) => key("ArrowRight"),
        Input::Key(Key::Space) => key(" "),
        Input::Key(Key::Escape) => key("Escape"),
        Input::Key(Key::Other) => key("a"),
        Input::TouchStart { x } => touch("touchstart", x),
        Input::TouchEnd { x } => touch("touchend", x),
        Input::PointerEnter => pointer("mouseenter"),
        Input::PointerLeave => pointer("mouseleave"),
    }
}

/// `[current, lightbox index or -1, body scroll locked, autoplay running]`
/// as read from the page.
fn browser_state(tab: &Tab) -> (u64, i64, bool, bool) {
    let value = tab
        .evaluate(
            &format!(
                "(function () {{
                    var root = document.querySelector('#{MOUNT} .slider-root');
                    var lightbox = root.getAttribute('data-lightbox');
                    return JSON.stringify([
                        parseInt(root.getAttribute('data-current'), 10),
                        lightbox === null ? -1 : parseInt(lightbox, 10),
                        document.body.style.overflow === 'hidden',
                        root.getAttribute('data-autoplay') === 'running'
                    ]);
                }})()"
            ),
            false,
        )
        .expect("failed to evaluate JS")
        .value
        .expect("no value returned");
    let state: Value = serde_json::from_str(value.as_str().unwrap()).unwrap();
    (
        state[0].as_u64().unwrap(),
        state[1].as_i64().unwrap(),
        state[2].as_bool().unwrap(),
        state[3].as_bool().unwrap(),
    )
}

fn live_state(live: &LiveSlider) -> (u64, i64, bool, bool) {
    (
        live.current().unwrap_or(0) as u64,
        live.lightbox_index().map_or(-1, |i| i as i64),
        live.body_scroll_locked(),
        live.is_autoplay_running(),
    )
}

fn replay(pair: &mut Pair, inputs: &[Input]) {
    assert_eq!(browser_state(&pair.tab), live_state(&pair.live), "initial state");
    for (step, input) in inputs.iter().enumerate() {
        pair.tab
            .evaluate(&script_for(*input), false)
            .expect("failed to dispatch input");
        pair.live.dispatch(*input);
        assert_eq!(
            browser_state(&pair.tab),
            live_state(&pair.live),
            "diverged at step {step} after {input:?}"
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
#[ignore]
fn slide_navigation_matches() {
    let mut pair = load_pair(5, json!({}));
    replay(
        &mut pair,
        &[
            Input::Click(Target::Prev),
            Input::Click(Target::Prev),
            Input::Click(Target::Next),
            Input::Click(Target::Indicator(1)),
            Input::Click(Target::Indicator(1)),
            Input::Click(Target::Next),
            Input::Click(Target::Next),
            Input::Click(Target::Next),
            Input::Click(Target::Next),
        ],
    );
}

#[test]
#[ignore]
fn keyboard_requires_hover() {
    let mut pair = load_pair(4, json!({}));
    replay(
        &mut pair,
        &[
            Input::Key(Key::ArrowRight),
            Input::PointerEnter,
            Input::Key(Key::ArrowRight),
            Input::Key(Key::ArrowRight),
            Input::Key(Key::ArrowLeft),
            Input::Key(Key::Other),
            Input::PointerLeave,
            Input::Key(Key::ArrowLeft),
        ],
    );
}

#[test]
#[ignore]
fn keyboard_disabled_ignores_arrows() {
    let mut pair = load_pair(4, json!({"enableKeyboard": false}));
    replay(
        &mut pair,
        &[
            Input::PointerEnter,
            Input::Key(Key::ArrowRight),
            Input::Click(Target::Next),
        ],
    );
}

#[test]
#[ignore]
fn swipes_past_threshold_navigate() {
    let mut pair = load_pair(3, json!({}));
    replay(
        &mut pair,
        &[
            Input::TouchStart { x: 300.0 },
            Input::TouchEnd { x: 200.0 },
            Input::TouchStart { x: 300.0 },
            Input::TouchEnd { x: 270.0 },
            Input::TouchStart { x: 100.0 },
            Input::TouchEnd { x: 220.0 },
            Input::TouchStart { x: 100.0 },
            Input::TouchEnd { x: 220.0 },
        ],
    );
}

#[test]
#[ignore]
fn lightbox_matches_including_wraparound_and_scroll_lock() {
    let mut pair = load_pair(5, json!({}));
    replay(
        &mut pair,
        &[
            Input::Click(Target::Image(2)),
            Input::Click(Target::LightboxPrev),
            Input::Click(Target::LightboxPrev),
            Input::Click(Target::LightboxPrev),
            Input::Key(Key::ArrowRight),
            Input::Key(Key::Escape),
            Input::Click(Target::Image(4)),
            Input::Click(Target::LightboxNext),
            Input::Click(Target::LightboxBackdrop),
            Input::Key(Key::Escape),
        ],
    );
}

#[test]
#[ignore]
fn lightbox_keys_take_priority_over_navigation() {
    let mut pair = load_pair(5, json!({}));
    replay(
        &mut pair,
        &[
            Input::PointerEnter,
            Input::Click(Target::Image(0)),
            Input::Key(Key::ArrowLeft),
            Input::Key(Key::ArrowLeft),
            Input::Click(Target::LightboxClose),
            Input::Key(Key::ArrowLeft),
        ],
    );
}

#[test]
#[ignore]
fn grid_pages_match() {
    let mut pair = load_pair(20, json!({"layout": "grid"}));
    replay(
        &mut pair,
        &[
            Input::Click(Target::Next),
            Input::Click(Target::Next),
            Input::Click(Target::Next),
            Input::Click(Target::Prev),
            Input::Click(Target::Indicator(2)),
            Input::Click(Target::Image(19)),
            Input::Click(Target::LightboxNext),
            Input::Key(Key::Escape),
        ],
    );
}

#[test]
#[ignore]
fn autoplay_state_matches_through_hover_keys_and_touch() {
    let mut pair = load_autoplay_pair(4, json!({}));
    replay(
        &mut pair,
        &[
            Input::Click(Target::Next),
            Input::PointerEnter,
            Input::Key(Key::Space),
            Input::Key(Key::Space),
            Input::Key(Key::Space),
            Input::PointerLeave,
            Input::Key(Key::Space),
            Input::TouchStart { x: 300.0 },
            Input::TouchEnd { x: 150.0 },
            Input::TouchStart { x: 200.0 },
            Input::TouchEnd { x: 190.0 },
            Input::PointerEnter,
            Input::Click(Target::Image(1)),
            Input::Key(Key::Space),
            Input::Key(Key::Escape),
            Input::PointerLeave,
        ],
    );
}

#[test]
#[ignore]
fn autoplay_stays_off_for_single_image_and_without_keyboard() {
    let mut single = load_autoplay_pair(1, json!({}));
    replay(
        &mut single,
        &[Input::PointerEnter, Input::Key(Key::Space), Input::PointerLeave],
    );

    let mut no_keys = load_autoplay_pair(3, json!({"enableKeyboard": false}));
    replay(
        &mut no_keys,
        &[
            Input::PointerEnter,
            Input::Key(Key::Space),
            Input::PointerLeave,
            Input::Key(Key::Space),
        ],
    );
}
