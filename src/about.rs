use serde::Serialize;
use tauri::{AppHandle, Manager, WebviewUrl, WebviewWindowBuilder, WindowEvent};

use crate::context::{try_with_controller, with_controller};

pub const ABOUT_LABEL: &str = "about";

/// Contents of the About panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub author: String,
    pub role: String,
    pub bio: String,
    pub copyright: String,
}

impl AboutInfo {
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            description: "A native macOS overlay for Grok AI.\nPress ⌥ Space to summon anywhere."
                .to_string(),
            author: "Sumit Duster".to_string(),
            role: "Developer".to_string(),
            bio: "macOS & iOS Developer\nBuilding intuitive apps".to_string(),
            copyright: "© 2025 Sumit Duster".to_string(),
        }
    }

    pub fn version_label(&self) -> String {
        format!("Version {}", self.version)
    }
}

/// Open the About panel, reusing the open one.
pub fn show(app: &AppHandle) {
    if let Some(existing) = app.get_webview_window(ABOUT_LABEL) {
        let _ = existing.show();
        let _ = existing.set_focus();
        return;
    }

    let builder =
        WebviewWindowBuilder::new(app, ABOUT_LABEL, WebviewUrl::App("about/index.html".into()))
            .title("")
            .inner_size(280.0, 340.0)
            .resizable(false)
            .minimizable(false)
            .maximizable(false)
            .center();
    #[cfg(target_os = "macos")]
    let builder = builder
        .title_bar_style(tauri::TitleBarStyle::Overlay)
        .hidden_title(true);

    let window = match builder.build() {
        Ok(w) => w,
        Err(e) => {
            tracing::error!("failed to create about window: {e}");
            return;
        }
    };

    let handle = app.clone();
    window.on_window_event(move |event| {
        if let WindowEvent::Destroyed = event {
            try_with_controller(&handle, |c| c.about_closed());
        }
    });
    let _ = window.set_focus();

    with_controller(app, |c| c.set_about_panel(window));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn about_info_contents() {
        let info = AboutInfo::new("Grok", "1.2.0");
        assert_eq!(info.version_label(), "Version 1.2.0");
        assert!(info.description.contains("⌥ Space"));
        assert_eq!(info.copyright, "© 2025 Sumit Duster");
    }

    #[test]
    fn about_info_serializes_camel_case() {
        let json = serde_json::to_value(AboutInfo::new("Grok", "0.1.0")).unwrap();
        assert_eq!(json["name"], "Grok");
        assert_eq!(json["version"], "0.1.0");
        assert_eq!(json["author"], "Sumit Duster");
    }
}
