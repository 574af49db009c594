use std::path::PathBuf;

use tauri::webview::{Webview, WebviewBuilder};
use tauri::window::{Window, WindowBuilder};
use tauri::{AppHandle, LogicalPosition, LogicalSize, WebviewUrl, WebviewWindow};

use super::chrome::ChromeView;
use super::layout::{OverlayLayout, Rect, Size};
use super::{OverlayShell, CHROME_LABEL, OVERLAY_LABEL};
use crate::browser::{self, BrowserHost};
use crate::config::OverlayConfig;
use crate::error::OverlayError;

/// Local page rendering the drag strip and traffic lights.
const CHROME_PAGE: &str = "chrome/index.html";

/// The overlay window, its drag-strip webview and the browser webview.
#[derive(Clone)]
pub struct TauriShell {
    app: AppHandle,
    window: Window,
    chrome: Webview,
    browser: BrowserHost,
    drag_area_height: f64,
}

impl TauriShell {
    /// Create the overlay window hidden, with the drag strip on top and the
    /// browser filling the rest.
    pub fn build(app: &AppHandle, config: &OverlayConfig) -> Result<Self, OverlayError> {
        let frame = config.frame;
        let home = config.home_url()?;

        let window = WindowBuilder::new(app, OVERLAY_LABEL)
            .title(&config.title)
            .inner_size(frame.width, frame.height)
            .position(frame.x, frame.y)
            .decorations(false)
            .transparent(true)
            .resizable(true)
            .minimizable(true)
            .visible(false)
            .build()?;

        let layout = OverlayLayout::new(Size::new(frame.width, frame.height), config.drag_area_height);

        let chrome = window.add_child(
            WebviewBuilder::new(CHROME_LABEL, WebviewUrl::App(PathBuf::from(CHROME_PAGE)))
                .transparent(true),
            position(layout.drag_area),
            size(layout.drag_area),
        )?;
        let browser_view = window.add_child(
            browser::webview_builder(config),
            position(layout.browser),
            size(layout.browser),
        )?;

        #[cfg(target_os = "macos")]
        super::macos::configure_window(&window, config)?;

        tracing::info!(
            width = frame.width,
            height = frame.height,
            "overlay window created"
        );

        Ok(Self {
            app: app.clone(),
            window,
            chrome,
            browser: BrowserHost::new(browser_view, home),
            drag_area_height: config.drag_area_height,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn browser(&self) -> &BrowserHost {
        &self.browser
    }

    /// Current content size in logical points.
    pub fn content_size(&self) -> Result<Size, OverlayError> {
        let scale = self.window.scale_factor()?;
        let logical: LogicalSize<f64> = self.window.inner_size()?.to_logical(scale);
        Ok(Size::new(logical.width, logical.height))
    }

    pub fn layout_for(&self, content: Size) -> OverlayLayout {
        OverlayLayout::new(content, self.drag_area_height)
    }

    /// Move both webviews to the frames of `layout`.
    pub fn apply_layout(&self, layout: &OverlayLayout) -> Result<(), OverlayError> {
        self.chrome.set_position(position(layout.drag_area))?;
        self.chrome.set_size(size(layout.drag_area))?;
        self.browser.webview().set_position(position(layout.browser))?;
        self.browser.webview().set_size(size(layout.browser))?;
        Ok(())
    }

    /// Push the strip state to the chrome page.
    pub fn render_chrome(&self, view: &ChromeView) -> Result<(), OverlayError> {
        let json = serde_json::to_string(view)
            .map_err(|e| OverlayError::Config(format!("chrome view: {e}")))?;
        self.chrome.eval(format!(
            "window.__overlayChrome && window.__overlayChrome.render({json});"
        ))?;
        Ok(())
    }

    /// Standard zoom: maximize, or restore when already maximized.
    pub fn toggle_zoom(&self) -> Result<(), OverlayError> {
        if self.window.is_maximized()? {
            self.window.unmaximize()?;
        } else {
            self.window.maximize()?;
        }
        Ok(())
    }

    /// Start a native window drag from the current mouse-down.
    pub fn begin_drag(&self) -> Result<(), OverlayError> {
        self.window.start_dragging()?;
        Ok(())
    }
}

impl OverlayShell for TauriShell {
    type Panel = WebviewWindow;

    fn bring_to_front(&self) -> Result<(), OverlayError> {
        #[cfg(target_os = "macos")]
        self.app.show()?;
        if self.window.is_minimized()? {
            self.window.unminimize()?;
        }
        self.window.show()?;
        self.window.set_focus()?;
        Ok(())
    }

    fn focus_input(&self) {
        self.browser.focus_input();
    }

    fn hide_application(&self) -> Result<(), OverlayError> {
        #[cfg(target_os = "macos")]
        self.app.hide()?;
        #[cfg(not(target_os = "macos"))]
        self.window.hide()?;
        Ok(())
    }

    fn minimize(&self) -> Result<(), OverlayError> {
        self.window.minimize()?;
        Ok(())
    }

    fn close_panel(&self, panel: Self::Panel) {
        if let Err(e) = panel.close() {
            tracing::warn!(label = panel.label(), "failed to close panel: {e}");
        }
    }
}

fn position(rect: Rect) -> LogicalPosition<f64> {
    LogicalPosition::new(rect.x, rect.y)
}

fn size(rect: Rect) -> LogicalSize<f64> {
    LogicalSize::new(rect.width, rect.height)
}
