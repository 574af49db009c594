use tauri::{command, AppHandle, State};

use crate::about::AboutInfo;
use crate::context::{with_controller, AppContext};
use crate::overlay::chrome::{ButtonRole, ChromeView};
use crate::overlay::layout::Point;
use crate::overlay::MouseDisposition;
use crate::trigger;

/// Background color reported by the hosted page.
#[command]
pub fn report_background_color(ctx: State<'_, AppContext>, color: String) {
    let changed = match ctx.chrome.lock() {
        Ok(mut chrome) => chrome.apply_background_report(&color),
        Err(e) => {
            tracing::error!("chrome state poisoned: {e}");
            false
        }
    };
    if changed {
        tracing::debug!(%color, "drag strip tint updated");
        ctx.render_chrome();
    }
}

/// Initial snapshot for the drag-strip page.
#[command]
pub fn chrome_state(ctx: State<'_, AppContext>) -> Result<ChromeView, String> {
    let chrome = ctx.chrome.lock().map_err(|e| e.to_string())?;
    Ok(chrome.view())
}

#[command]
pub fn chrome_hover(ctx: State<'_, AppContext>, role: ButtonRole, hovered: bool) {
    let changed = ctx
        .chrome
        .lock()
        .map(|mut chrome| chrome.set_hovered(role, hovered))
        .unwrap_or(false);
    if changed {
        ctx.render_chrome();
    }
}

/// Traffic light click: close hides, minimize miniaturizes, zoom zooms.
#[command]
pub fn chrome_button(app: AppHandle, ctx: State<'_, AppContext>, role: ButtonRole) -> Result<(), String> {
    tracing::debug!(?role, "traffic light pressed");
    match role {
        ButtonRole::Close => {
            with_controller(&app, |c| c.hide());
            Ok(())
        }
        ButtonRole::Minimize => {
            with_controller(&app, |c| c.minimize());
            Ok(())
        }
        ButtonRole::Zoom => ctx.shell.toggle_zoom().map_err(Into::into),
    }
}

/// Mouse-down on the drag strip as seen by the strip page. On macOS the native
/// monitor handles this before the page sees it.
#[command]
pub fn drag_strip_pressed(app: AppHandle, ctx: State<'_, AppContext>, x: f64, y: f64) -> Result<(), String> {
    let content = ctx.shell.content_size()?;
    let height = ctx.config.drag_area_height;
    let disposition = with_controller(&app, |c| c.on_left_mouse_down(Point::new(x, y), content, height))
        .unwrap_or(MouseDisposition::PassThrough);
    if disposition == MouseDisposition::BeginDrag {
        ctx.shell.begin_drag()?;
    }
    Ok(())
}

#[command]
pub fn about_info(app: AppHandle, ctx: State<'_, AppContext>) -> AboutInfo {
    AboutInfo::new(&ctx.config.title, &app.package_info().version.to_string())
}

#[command]
pub fn current_trigger(ctx: State<'_, AppContext>) -> Result<String, String> {
    let listener = ctx.hotkey.lock().map_err(|e| e.to_string())?;
    Ok(listener.binding().accelerator())
}

/// Store and activate the captured trigger. Returns the canonical accelerator.
#[command]
pub async fn set_trigger(app: AppHandle, accelerator: String) -> Result<String, String> {
    let binding = trigger::apply(&app, &accelerator).await.map_err(|e| {
        tracing::warn!("trigger rejected: {e}");
        e.to_string()
    })?;
    Ok(binding.accelerator())
}

#[command]
pub fn cancel_trigger_capture(app: AppHandle) {
    trigger::close(&app);
}
