//! All shared state of the running app, constructed once in setup and
//! managed by Tauri.

use std::sync::{Arc, Mutex};

use tauri::{AppHandle, Manager};

use crate::appearance::{Appearance, StatusIconSync};
use crate::config::OverlayConfig;
use crate::events::Signal;
use crate::hotkey::{HotkeyBinding, HotkeyListener};
use crate::overlay::chrome::ChromeState;
use crate::overlay::layout::Size;
use crate::overlay::shell::TauriShell;
use crate::overlay::OverlayController;
use crate::preferences::PreferenceStore;

pub struct AppContext {
    pub config: OverlayConfig,
    pub controller: Mutex<OverlayController<TauriShell>>,
    /// Handle copy for work that must not take the controller lock.
    pub shell: TauriShell,
    pub chrome: Mutex<ChromeState>,
    pub hotkey: Mutex<HotkeyListener>,
    pub status_icon: Mutex<StatusIconSync>,
    pub preferences: Arc<dyn PreferenceStore>,
    pub resized: Signal<Size>,
    pub appearance: Signal<Appearance>,
}

impl AppContext {
    pub fn new(
        config: OverlayConfig,
        shell: TauriShell,
        preferences: Arc<dyn PreferenceStore>,
        binding: HotkeyBinding,
        appearance: Appearance,
    ) -> Self {
        Self {
            config,
            controller: Mutex::new(OverlayController::new(shell.clone())),
            shell,
            chrome: Mutex::new(ChromeState::default()),
            hotkey: Mutex::new(HotkeyListener::new(binding)),
            status_icon: Mutex::new(StatusIconSync::new(appearance)),
            preferences,
            resized: Signal::new(),
            appearance: Signal::new(),
        }
    }

    /// Re-render the drag strip from the current chrome state.
    pub fn render_chrome(&self) {
        let view = match self.chrome.lock() {
            Ok(chrome) => chrome.view(),
            Err(e) => {
                tracing::error!("chrome state poisoned: {e}");
                return;
            }
        };
        if let Err(e) = self.shell.render_chrome(&view) {
            tracing::debug!("chrome render skipped: {e}");
        }
    }
}

/// Run `f` with the controller locked. `None` if the context is not managed
/// yet or the lock is poisoned.
pub fn with_controller<R>(
    app: &AppHandle,
    f: impl FnOnce(&mut OverlayController<TauriShell>) -> R,
) -> Option<R> {
    let ctx = app.try_state::<AppContext>()?;
    let mut controller = match ctx.controller.lock() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("overlay controller poisoned: {e}");
            return None;
        }
    };
    Some(f(&mut controller))
}

/// Like [`with_controller`] but skips when the controller is already locked.
/// Native callbacks can be delivered while a `show()`/`hide()` is in flight.
pub fn try_with_controller<R>(
    app: &AppHandle,
    f: impl FnOnce(&mut OverlayController<TauriShell>) -> R,
) -> Option<R> {
    let ctx = app.try_state::<AppContext>()?;
    let mut controller = ctx.controller.try_lock().ok()?;
    Some(f(&mut controller))
}
