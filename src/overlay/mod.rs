pub mod chrome;
pub mod layout;
pub mod shell;

#[cfg(target_os = "macos")]
pub mod macos;

use layout::{OverlayLayout, Point, Region, Size};

use crate::error::OverlayError;

/// Window labels.
pub const OVERLAY_LABEL: &str = "overlay";
pub const BROWSER_LABEL: &str = "browser";
pub const CHROME_LABEL: &str = "chrome";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Hidden,
    VisibleUnfocused,
    VisibleKey,
}

/// Outcome of a left mouse-down inside the overlay window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseDisposition {
    /// The window was brought forward; the caller starts a window drag from
    /// this event and consumes it.
    BeginDrag,
    /// Deliver the event unmodified.
    PassThrough,
}

/// Native side effects the controller drives.
///
/// Each platform provides its own implementation; tests use a recording mock.
pub trait OverlayShell {
    /// Secondary window (the About panel).
    type Panel;

    /// Unhide the application, order the window front and make it key.
    fn bring_to_front(&self) -> Result<(), OverlayError>;

    /// Move keyboard focus to the page's primary input control.
    fn focus_input(&self);

    /// Hide the whole application so focus returns to the previous one.
    fn hide_application(&self) -> Result<(), OverlayError>;

    /// Miniaturize the overlay window into the Dock.
    fn minimize(&self) -> Result<(), OverlayError>;

    fn close_panel(&self, panel: Self::Panel);
}

type FirstShowHook = Box<dyn FnOnce() + Send>;

/// Show/hide state machine of the overlay window.
pub struct OverlayController<S: OverlayShell> {
    shell: S,
    state: Visibility,
    about: Option<S::Panel>,
    first_show_hooks: Vec<FirstShowHook>,
    shown_once: bool,
}

impl<S: OverlayShell> OverlayController<S> {
    pub fn new(shell: S) -> Self {
        Self {
            shell,
            state: Visibility::Hidden,
            about: None,
            first_show_hooks: Vec::new(),
            shown_once: false,
        }
    }

    pub fn state(&self) -> Visibility {
        self.state
    }

    pub fn toggle(&mut self) {
        match self.state {
            Visibility::Hidden => self.show(),
            Visibility::VisibleUnfocused | Visibility::VisibleKey => self.hide(),
        }
    }

    pub fn show(&mut self) {
        if let Err(e) = self.shell.bring_to_front() {
            tracing::warn!("failed to bring overlay to front: {e}");
        }
        self.shell.focus_input();
        self.state = Visibility::VisibleKey;

        if !self.shown_once {
            self.shown_once = true;
            let hooks = std::mem::take(&mut self.first_show_hooks);
            tracing::debug!(count = hooks.len(), "running first-show hooks");
            for hook in hooks {
                hook();
            }
        }
    }

    pub fn hide(&mut self) {
        if let Some(panel) = self.about.take() {
            self.shell.close_panel(panel);
        }
        if let Err(e) = self.shell.hide_application() {
            tracing::warn!("failed to hide overlay: {e}");
        }
        self.state = Visibility::Hidden;
    }

    /// Miniaturize the window. A minimized overlay counts as hidden, so the
    /// next toggle brings it back.
    pub fn minimize(&mut self) {
        if let Err(e) = self.shell.minimize() {
            tracing::warn!("failed to minimize overlay: {e}");
            return;
        }
        self.state = Visibility::Hidden;
    }

    /// OS focus change for the overlay window. Losing focus never hides.
    pub fn focus_changed(&mut self, focused: bool) {
        self.state = match (focused, self.state) {
            (true, _) => Visibility::VisibleKey,
            (false, Visibility::Hidden) => Visibility::Hidden,
            (false, _) => Visibility::VisibleUnfocused,
        };
    }

    /// Run `hook` once, right after the window first becomes visible. Hooks
    /// registered after that point run immediately.
    pub fn after_first_show(&mut self, hook: impl FnOnce() + Send + 'static) {
        if self.shown_once {
            hook();
        } else {
            self.first_show_hooks.push(Box::new(hook));
        }
    }

    /// Decide what a left mouse-down at `point` (top-left content
    /// coordinates) does. A press on the drag strip brings the window forward
    /// and starts a drag from the same event.
    pub fn on_left_mouse_down(
        &mut self,
        point: Point,
        content: Size,
        drag_area_height: f64,
    ) -> MouseDisposition {
        match OverlayLayout::new(content, drag_area_height).hit_test(point) {
            Region::DragArea => {
                self.show();
                MouseDisposition::BeginDrag
            }
            Region::TrafficLight(_) | Region::Browser | Region::Outside => {
                MouseDisposition::PassThrough
            }
        }
    }

    pub fn about_panel(&self) -> Option<&S::Panel> {
        self.about.as_ref()
    }

    /// Track a newly opened About panel, closing any previous one.
    pub fn set_about_panel(&mut self, panel: S::Panel) {
        if let Some(old) = self.about.replace(panel) {
            self.shell.close_panel(old);
        }
    }

    /// The panel closed itself; drop the reference.
    pub fn about_closed(&mut self) {
        self.about = None;
    }
}
