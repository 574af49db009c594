pub mod about;
pub mod appearance;
pub mod autostart;
pub mod browser;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod hotkey;
pub mod logging;
pub mod menu;
pub mod overlay;
pub mod preferences;
pub mod tray;
pub mod trigger;

use std::sync::Arc;

use tauri::{AppHandle, Manager, WindowEvent};
use tauri_plugin_global_shortcut::{Shortcut, ShortcutEvent};

use crate::appearance::{Appearance, StatusIconVariant};
use crate::config::OverlayConfig;
use crate::context::{try_with_controller, with_controller, AppContext};
use crate::hotkey::KeyDown;
use crate::overlay::layout::Size;
use crate::overlay::shell::TauriShell;
use crate::preferences::{PreferenceStore, SqlitePreferences};

/// Every system-wide press of a registered shortcut lands here.
fn on_shortcut(app: &AppHandle, shortcut: &Shortcut, event: ShortcutEvent) {
    let Some(key) = KeyDown::from_shortcut_event(shortcut, &event) else {
        return;
    };
    let Some(ctx) = app.try_state::<AppContext>() else {
        return;
    };
    let listener = match ctx.hotkey.lock() {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("hotkey listener poisoned: {e}");
            return;
        }
    };
    listener.on_key_down(&key, || {
        with_controller(app, |c| c.toggle());
    });
}

async fn open_preferences(app: &AppHandle) -> Arc<dyn PreferenceStore> {
    let opened = match app.path().app_data_dir() {
        Ok(dir) => SqlitePreferences::open(&dir).await,
        Err(e) => Err(e.into()),
    };
    match opened {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!("preferences unavailable, using a temporary store: {e}");
            match SqlitePreferences::in_memory().await {
                Ok(store) => Arc::new(store),
                Err(e) => {
                    tracing::error!("temporary store failed: {e}");
                    Arc::new(NoPreferences)
                }
            }
        }
    }
}

/// Last-resort store that remembers nothing.
struct NoPreferences;

#[async_trait::async_trait]
impl PreferenceStore for NoPreferences {
    async fn load_trigger(&self) -> Result<Option<String>, error::OverlayError> {
        Ok(None)
    }

    async fn save_trigger(&self, _accelerator: &str) -> Result<(), error::OverlayError> {
        Ok(())
    }
}

/// Route native window events of the overlay into the controller and signals.
fn watch_overlay_window(app: &AppHandle, shell: &TauriShell) {
    let handle = app.clone();
    let window = shell.window().clone();
    shell.window().on_window_event(move |event| match event {
        WindowEvent::Focused(focused) => {
            try_with_controller(&handle, |c| c.focus_changed(*focused));
        }
        WindowEvent::Resized(physical) => {
            let Some(ctx) = handle.try_state::<AppContext>() else {
                return;
            };
            let scale = window.scale_factor().unwrap_or(1.0);
            let logical = physical.to_logical::<f64>(scale);
            ctx.resized.emit(&Size::new(logical.width, logical.height));
        }
        // On macOS the status item reports the menu-bar appearance itself.
        #[cfg(not(target_os = "macos"))]
        WindowEvent::ThemeChanged(theme) => {
            if let Some(ctx) = handle.try_state::<AppContext>() {
                ctx.appearance.emit(&Appearance::from(*theme));
            }
        }
        WindowEvent::CloseRequested { api, .. } => {
            api.prevent_close();
            try_with_controller(&handle, |c| c.hide());
        }
        _ => {}
    });
}

fn subscribe_signals(app: &AppHandle, ctx: &AppContext) {
    let shell = ctx.shell.clone();
    ctx.resized.subscribe(move |size| {
        let layout = shell.layout_for(*size);
        if let Err(e) = shell.apply_layout(&layout) {
            tracing::warn!("failed to apply layout: {e}");
        }
    });

    let handle = app.clone();
    ctx.appearance.subscribe(move |appearance| {
        let Some(ctx) = handle.try_state::<AppContext>() else {
            return;
        };
        let next = match ctx.status_icon.lock() {
            Ok(mut sync) => sync.apply(*appearance),
            Err(e) => {
                tracing::error!("status icon state poisoned: {e}");
                None
            }
        };
        if let Some(variant) = next {
            if let Err(e) = tray::set_icon(&handle, variant) {
                tracing::warn!("failed to update status icon: {e}");
            }
        }
    });
}

fn setup(app: &mut tauri::App) -> Result<(), Box<dyn std::error::Error>> {
    let handle = app.handle().clone();

    #[cfg(target_os = "macos")]
    app.set_activation_policy(tauri::ActivationPolicy::Regular);

    let config = match handle.path().app_config_dir() {
        Ok(dir) => OverlayConfig::load_or_default(&dir),
        Err(e) => {
            tracing::warn!("no config directory: {e}");
            OverlayConfig::default()
        }
    };

    let preferences = tauri::async_runtime::block_on(open_preferences(&handle));
    let binding = tauri::async_runtime::block_on(preferences::load_binding(preferences.as_ref()));

    let shell = TauriShell::build(&handle, &config)?;
    // Corrected as soon as the status item reports its own appearance.
    let appearance = Appearance::Light;
    let title = config.title.clone();

    app.manage(AppContext::new(
        config,
        shell.clone(),
        preferences,
        binding,
        appearance,
    ));
    let ctx = app.state::<AppContext>();

    if let Err(e) = hotkey::install(&handle, &binding) {
        tracing::warn!("global trigger unavailable, use the status menu: {e}");
    }

    if let Err(e) = tray::setup_tray(&handle, &title, StatusIconVariant::for_appearance(appearance)) {
        tracing::error!("failed to create status item: {e}");
    }

    #[cfg(target_os = "macos")]
    {
        app.set_menu(menu::build_app_menu(&handle, &title)?)?;

        let monitor_app = handle.clone();
        overlay::macos::install_drag_monitor(shell.window(), move |point, size| {
            let Some(ctx) = monitor_app.try_state::<AppContext>() else {
                return overlay::MouseDisposition::PassThrough;
            };
            let height = ctx.config.drag_area_height;
            match ctx.controller.try_lock() {
                Ok(mut c) => c.on_left_mouse_down(point, size, height),
                Err(_) => overlay::MouseDisposition::PassThrough,
            }
        })?;
    }

    watch_overlay_window(&handle, &shell);
    subscribe_signals(&handle, &ctx);

    // The window may have restored an autosaved frame of a different size.
    match shell.content_size() {
        Ok(size) => {
            if let Err(e) = shell.apply_layout(&shell.layout_for(size)) {
                tracing::warn!("failed to apply initial layout: {e}");
            }
        }
        Err(e) => tracing::warn!("content size unavailable: {e}"),
    }

    if let Some(status_item) = handle.tray_by_id(tray::TRAY_ID) {
        let observer_app = handle.clone();
        let observed = appearance::observe_status_item(&status_item, move |appearance| {
            if let Some(ctx) = observer_app.try_state::<AppContext>() {
                ctx.appearance.emit(&appearance);
            }
        });
        if let Err(e) = observed {
            tracing::warn!("status icon will not follow the menu bar: {e}");
        }
    }

    with_controller(&handle, |c| {
        let browser = shell.browser().clone();
        c.after_first_show(move || {
            if let Err(e) = browser.navigate_home() {
                tracing::warn!("failed to load home page: {e}");
            }
        });
        c.after_first_show(browser::request_microphone_permission);
        c.show();
    });

    tracing::info!(trigger = %binding.accelerator(), "overlay ready");
    Ok(())
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    logging::init();

    tauri::Builder::default()
        .plugin(
            tauri_plugin_global_shortcut::Builder::new()
                .with_handler(|app, shortcut, event| on_shortcut(app, shortcut, event))
                .build(),
        )
        .plugin(tauri_plugin_autostart::init(
            tauri_plugin_autostart::MacosLauncher::LaunchAgent,
            None,
        ))
        .on_menu_event(|app, event| menu::dispatch(app, event.id().as_ref()))
        .invoke_handler(tauri::generate_handler![
            commands::report_background_color,
            commands::chrome_state,
            commands::chrome_hover,
            commands::chrome_button,
            commands::drag_strip_pressed,
            commands::about_info,
            commands::current_trigger,
            commands::set_trigger,
            commands::cancel_trigger_capture,
        ])
        .setup(setup)
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(|app, event| {
            #[cfg(target_os = "macos")]
            if let tauri::RunEvent::Reopen { .. } = event {
                with_controller(app, |c| c.show());
            }
            #[cfg(not(target_os = "macos"))]
            let _ = (app, event);
        });
}
