//! Capturing a new global trigger from the user.

use std::sync::Mutex;

use tauri::{AppHandle, Manager, WebviewUrl, WebviewWindowBuilder, WindowEvent};

use crate::context::AppContext;
use crate::error::OverlayError;
use crate::hotkey::{self, HotkeyBinding, HotkeyListener};
use crate::preferences::PreferenceStore;

pub const TRIGGER_LABEL: &str = "trigger";

/// Open the capture window, or focus it if it is already open. The current
/// trigger stops toggling the overlay until the window goes away.
pub fn open(app: &AppHandle) {
    let window = match app.get_webview_window(TRIGGER_LABEL) {
        Some(w) => w,
        None => match WebviewWindowBuilder::new(
            app,
            TRIGGER_LABEL,
            WebviewUrl::App("trigger/index.html".into()),
        )
        .title("Set New Trigger")
        .inner_size(360.0, 180.0)
        .resizable(false)
        .always_on_top(true)
        .center()
        .build()
        {
            Ok(w) => {
                let handle = app.clone();
                w.on_window_event(move |event| {
                    if let WindowEvent::Destroyed = event {
                        set_capturing(&handle, false);
                    }
                });
                w
            }
            Err(e) => {
                tracing::error!("failed to create trigger window: {e}");
                return;
            }
        },
    };
    set_capturing(app, true);
    let _ = window.show();
    let _ = window.set_focus();
}

pub fn close(app: &AppHandle) {
    set_capturing(app, false);
    if let Some(window) = app.get_webview_window(TRIGGER_LABEL) {
        if let Err(e) = window.close() {
            tracing::warn!("failed to close trigger window: {e}");
        }
    }
}

fn set_capturing(app: &AppHandle, capturing: bool) {
    let Some(ctx) = app.try_state::<AppContext>() else {
        return;
    };
    match ctx.hotkey.lock() {
        Ok(mut listener) => listener.set_capturing(capturing),
        Err(e) => tracing::error!("hotkey listener poisoned: {e}"),
    };
}

/// Replace the active trigger with `accelerator`.
///
/// The system registration is swapped first through `register(old, new)`; the
/// listener and the store are only updated once that succeeded. A failed save
/// keeps the new trigger active for this session.
pub async fn change_trigger<F>(
    accelerator: &str,
    listener: &Mutex<HotkeyListener>,
    store: &dyn PreferenceStore,
    register: F,
) -> Result<HotkeyBinding, OverlayError>
where
    F: FnOnce(&HotkeyBinding, &HotkeyBinding) -> Result<(), OverlayError>,
{
    let binding = HotkeyBinding::parse(accelerator)?;
    let old = lock(listener)?.binding();

    register(&old, &binding)?;
    lock(listener)?.rebind(binding);

    if let Err(e) = store.save_trigger(&binding.accelerator()).await {
        tracing::warn!(trigger = %binding.accelerator(), "new trigger not persisted: {e}");
    }
    Ok(binding)
}

/// Apply a captured trigger against the running app and close the capture
/// window on success.
pub async fn apply(app: &AppHandle, accelerator: &str) -> Result<HotkeyBinding, OverlayError> {
    let ctx = app.state::<AppContext>();
    let store = ctx.preferences.clone();
    let binding = change_trigger(accelerator, &ctx.hotkey, store.as_ref(), |old, new| {
        hotkey::replace(app, old, new)
    })
    .await?;
    close(app);
    Ok(binding)
}

fn lock(
    listener: &Mutex<HotkeyListener>,
) -> Result<std::sync::MutexGuard<'_, HotkeyListener>, OverlayError> {
    listener
        .lock()
        .map_err(|e| OverlayError::Shortcut(format!("listener poisoned: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::SqlitePreferences;
    use tauri_plugin_global_shortcut::{Code, Modifiers};

    #[tokio::test]
    async fn change_rebinds_and_persists() {
        let store = SqlitePreferences::in_memory().await.unwrap();
        let listener = Mutex::new(HotkeyListener::default());
        let mut swapped = None;

        let binding = change_trigger("ctrl+shift+KeyG", &listener, &store, |old, new| {
            swapped = Some((*old, *new));
            Ok(())
        })
        .await
        .unwrap();

        let expected = HotkeyBinding::new(Modifiers::CONTROL | Modifiers::SHIFT, Code::KeyG);
        assert_eq!(binding, expected);
        assert_eq!(swapped, Some((HotkeyBinding::default(), expected)));
        assert_eq!(listener.lock().unwrap().binding(), expected);
        assert_eq!(
            store.load_trigger().await.unwrap(),
            Some(expected.accelerator())
        );
    }

    #[tokio::test]
    async fn invalid_combination_keeps_old_binding() {
        let store = SqlitePreferences::in_memory().await.unwrap();
        let listener = Mutex::new(HotkeyListener::default());

        let err = change_trigger("KeyG", &listener, &store, |_, _| {
            panic!("must not register an invalid trigger")
        })
        .await
        .unwrap_err();

        assert!(matches!(err, OverlayError::InvalidTrigger { .. }));
        assert_eq!(listener.lock().unwrap().binding(), HotkeyBinding::default());
        assert_eq!(store.load_trigger().await.unwrap(), None);
    }

    #[tokio::test]
    async fn registration_failure_changes_nothing() {
        let store = SqlitePreferences::in_memory().await.unwrap();
        let listener = Mutex::new(HotkeyListener::default());

        let err = change_trigger("super+KeyK", &listener, &store, |_, _| {
            Err(OverlayError::Shortcut("combination taken".into()))
        })
        .await
        .unwrap_err();

        assert!(matches!(err, OverlayError::Shortcut(_)));
        assert_eq!(listener.lock().unwrap().binding(), HotkeyBinding::default());
        assert_eq!(store.load_trigger().await.unwrap(), None);
    }
}
