//! State of the custom window chrome: drag-strip tint and traffic lights.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonRole {
    Close,
    Minimize,
    Zoom,
}

impl ButtonRole {
    pub const ALL: [ButtonRole; 3] = [ButtonRole::Close, ButtonRole::Minimize, ButtonRole::Zoom];

    pub fn base_color(self) -> Rgb {
        match self {
            ButtonRole::Close => Rgb::new(255, 97, 92),
            ButtonRole::Minimize => Rgb::new(255, 199, 59),
            ButtonRole::Zoom => Rgb::new(38, 199, 94),
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            ButtonRole::Close => "✕",
            ButtonRole::Minimize => "−",
            ButtonRole::Zoom => "+",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Parse a CSS color as reported by `getComputedStyle`.
///
/// Returns `None` for anything that should not recolor the strip: empty
/// strings, `transparent`, fully transparent `rgba`, and unparseable input.
pub fn parse_css_color(input: &str) -> Option<Rgb> {
    let s = input.trim().to_ascii_lowercase();
    if s.is_empty() || s == "transparent" {
        return None;
    }
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }
    let inner = s
        .strip_prefix("rgba(")
        .or_else(|| s.strip_prefix("rgb("))?
        .strip_suffix(')')?;
    parse_rgb_components(inner)
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let mut it = hex.chars().map(|c| channel(&c.to_string()).map(|v| v * 17));
            Some(Rgb::new(it.next()??, it.next()??, it.next()??))
        }
        6 => Some(Rgb::new(
            channel(hex.get(0..2)?)?,
            channel(hex.get(2..4)?)?,
            channel(hex.get(4..6)?)?,
        )),
        _ => None,
    }
}

fn parse_rgb_components(inner: &str) -> Option<Rgb> {
    // Legacy `r, g, b[, a]` or modern `r g b[ / a]`.
    let (channels, alpha): (Vec<&str>, Option<&str>) = if inner.contains(',') {
        let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
        match parts.len() {
            3 => (parts, None),
            4 => (parts[..3].to_vec(), Some(parts[3])),
            _ => return None,
        }
    } else {
        let (color, alpha) = match inner.split_once('/') {
            Some((c, a)) => (c, Some(a.trim())),
            None => (inner, None),
        };
        let parts: Vec<&str> = color.split_whitespace().collect();
        if parts.len() != 3 {
            return None;
        }
        (parts, alpha)
    };

    if let Some(a) = alpha {
        if parse_alpha(a)? <= 0.0 {
            return None;
        }
    }

    Some(Rgb::new(
        parse_channel(channels[0])?,
        parse_channel(channels[1])?,
        parse_channel(channels[2])?,
    ))
}

fn parse_channel(s: &str) -> Option<u8> {
    let value = match s.strip_suffix('%') {
        Some(pct) => pct.trim().parse::<f64>().ok()? / 100.0 * 255.0,
        None => s.parse::<f64>().ok()?,
    };
    value
        .is_finite()
        .then(|| value.round().clamp(0.0, 255.0) as u8)
}

fn parse_alpha(s: &str) -> Option<f64> {
    let value = match s.strip_suffix('%') {
        Some(pct) => pct.trim().parse::<f64>().ok()? / 100.0,
        None => s.parse::<f64>().ok()?,
    };
    value.is_finite().then_some(value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrafficLight {
    pub role: ButtonRole,
    hovered: bool,
}

impl TrafficLight {
    pub fn new(role: ButtonRole) -> Self {
        Self {
            role,
            hovered: false,
        }
    }

    /// The glyph is shown only while the pointer is over the button.
    pub fn visible_glyph(&self) -> Option<&'static str> {
        self.hovered.then(|| self.role.glyph())
    }
}

/// Serializable snapshot pushed to the drag-strip page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChromeView {
    pub tint: String,
    pub buttons: Vec<ButtonView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ButtonView {
    pub role: ButtonRole,
    pub color: String,
    pub glyph: Option<&'static str>,
}

#[derive(Debug, Clone)]
pub struct ChromeState {
    tint: Rgb,
    buttons: [TrafficLight; 3],
}

impl Default for ChromeState {
    fn default() -> Self {
        Self {
            tint: Rgb::WHITE,
            buttons: ButtonRole::ALL.map(TrafficLight::new),
        }
    }
}

impl ChromeState {
    pub fn tint(&self) -> Rgb {
        self.tint
    }

    pub fn button(&self, role: ButtonRole) -> &TrafficLight {
        &self.buttons[Self::index(role)]
    }

    /// Apply a background-color report from the hosted page. Returns whether
    /// the tint changed; malformed payloads are dropped silently.
    pub fn apply_background_report(&mut self, payload: &str) -> bool {
        match parse_css_color(payload) {
            Some(rgb) if rgb != self.tint => {
                self.tint = rgb;
                true
            }
            Some(_) => false,
            None => {
                tracing::trace!(payload, "background report dropped");
                false
            }
        }
    }

    /// Pointer entered (`true`) or left (`false`) a button. Returns whether
    /// anything visible changed.
    pub fn set_hovered(&mut self, role: ButtonRole, hovered: bool) -> bool {
        let button = &mut self.buttons[Self::index(role)];
        let changed = button.hovered != hovered;
        button.hovered = hovered;
        changed
    }

    pub fn view(&self) -> ChromeView {
        ChromeView {
            tint: self.tint.to_string(),
            buttons: self
                .buttons
                .iter()
                .map(|b| {
                    let c = b.role.base_color();
                    ButtonView {
                        role: b.role,
                        color: format!("#{:02X}{:02X}{:02X}", c.r, c.g, c.b),
                        glyph: b.visible_glyph(),
                    }
                })
                .collect(),
        }
    }

    fn index(role: ButtonRole) -> usize {
        match role {
            ButtonRole::Close => 0,
            ButtonRole::Minimize => 1,
            ButtonRole::Zoom => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_computed_style_rgb() {
        assert_eq!(parse_css_color("rgb(18,18,18)"), Some(Rgb::new(18, 18, 18)));
        assert_eq!(parse_css_color("rgb(18, 52, 86)"), Some(Rgb::new(18, 52, 86)));
        assert_eq!(parse_css_color("  RGB(1, 2, 3) "), Some(Rgb::new(1, 2, 3)));
    }

    #[test]
    fn parses_rgba_and_modern_syntax() {
        assert_eq!(parse_css_color("rgba(10, 20, 30, 0.5)"), Some(Rgb::new(10, 20, 30)));
        assert_eq!(parse_css_color("rgb(10 20 30)"), Some(Rgb::new(10, 20, 30)));
        assert_eq!(parse_css_color("rgb(10 20 30 / 50%)"), Some(Rgb::new(10, 20, 30)));
    }

    #[test]
    fn rounds_and_clamps_channels() {
        assert_eq!(parse_css_color("rgb(17.6, 300, -4)"), Some(Rgb::new(18, 255, 0)));
        assert_eq!(parse_css_color("rgb(100%, 0%, 50%)"), Some(Rgb::new(255, 0, 128)));
    }

    #[test]
    fn parses_hex() {
        assert_eq!(parse_css_color("#121212"), Some(Rgb::new(18, 18, 18)));
        assert_eq!(parse_css_color("#fff"), Some(Rgb::WHITE));
        assert_eq!(parse_css_color("#12345"), None);
        assert_eq!(parse_css_color("#gggggg"), None);
    }

    #[test]
    fn rejects_transparent_and_malformed() {
        for payload in [
            "",
            "   ",
            "transparent",
            "rgba(0, 0, 0, 0)",
            "rgb(1, 2)",
            "rgb(a, b, c)",
            "rgb(1, 2, 3",
            "hsl(120, 100%, 50%)",
            "color(srgb 1 0 0)",
            "rgb(NaN, 0, 0)",
        ] {
            assert_eq!(parse_css_color(payload), None, "payload {payload:?}");
        }
    }

    #[test]
    fn report_sets_opaque_tint() {
        let mut chrome = ChromeState::default();
        assert_eq!(chrome.tint(), Rgb::WHITE);

        assert!(chrome.apply_background_report("rgb(18,18,18)"));
        assert_eq!(chrome.tint(), Rgb::new(18, 18, 18));
        assert_eq!(chrome.view().tint, "rgb(18, 18, 18)");
    }

    #[test]
    fn invalid_report_keeps_previous_tint() {
        let mut chrome = ChromeState::default();
        chrome.apply_background_report("rgb(18,18,18)");

        assert!(!chrome.apply_background_report("transparent"));
        assert!(!chrome.apply_background_report(""));
        assert!(!chrome.apply_background_report("garbage"));
        assert_eq!(chrome.tint(), Rgb::new(18, 18, 18));
    }

    #[test]
    fn same_color_report_is_not_a_change() {
        let mut chrome = ChromeState::default();
        assert!(!chrome.apply_background_report("rgb(255, 255, 255)"));
    }

    #[test]
    fn glyph_visible_only_while_hovered() {
        let mut chrome = ChromeState::default();
        for role in ButtonRole::ALL {
            assert_eq!(chrome.button(role).visible_glyph(), None);
        }

        assert!(chrome.set_hovered(ButtonRole::Minimize, true));
        assert_eq!(chrome.button(ButtonRole::Minimize).visible_glyph(), Some("−"));
        assert_eq!(chrome.button(ButtonRole::Close).visible_glyph(), None);

        assert!(!chrome.set_hovered(ButtonRole::Minimize, true));
        assert!(chrome.set_hovered(ButtonRole::Minimize, false));
        assert_eq!(chrome.button(ButtonRole::Minimize).visible_glyph(), None);
    }

    #[test]
    fn view_serializes_for_the_strip_page() {
        let mut chrome = ChromeState::default();
        chrome.set_hovered(ButtonRole::Close, true);
        let json = serde_json::to_value(chrome.view()).unwrap();

        assert_eq!(json["tint"], "rgb(255, 255, 255)");
        assert_eq!(json["buttons"][0]["role"], "close");
        assert_eq!(json["buttons"][0]["color"], "#FF615C");
        assert_eq!(json["buttons"][0]["glyph"], "✕");
        assert!(json["buttons"][1]["glyph"].is_null());
        assert_eq!(json["buttons"][2]["role"], "zoom");
    }
}
