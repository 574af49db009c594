use tauri::menu::{Menu, MenuItem, PredefinedMenuItem};
use tauri::tray::TrayIconBuilder;
use tauri::{AppHandle, Manager};

use crate::appearance::StatusIconVariant;
use crate::context::{with_controller, AppContext};
use crate::error::OverlayError;
use crate::{about, autostart, trigger};

pub const TRAY_ID: &str = "status";

/// One entry of the status-bar menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Show,
    Hide,
    Home,
    ClearWebCache,
    SetNewTrigger,
    InstallAutolauncher,
    UninstallAutolauncher,
    About,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEntry {
    Action(MenuAction),
    Separator,
}

/// Status-bar menu, top to bottom.
pub const MENU_LAYOUT: [MenuEntry; 11] = [
    MenuEntry::Action(MenuAction::Show),
    MenuEntry::Action(MenuAction::Hide),
    MenuEntry::Action(MenuAction::Home),
    MenuEntry::Action(MenuAction::ClearWebCache),
    MenuEntry::Action(MenuAction::SetNewTrigger),
    MenuEntry::Action(MenuAction::InstallAutolauncher),
    MenuEntry::Action(MenuAction::UninstallAutolauncher),
    MenuEntry::Separator,
    MenuEntry::Action(MenuAction::About),
    MenuEntry::Separator,
    MenuEntry::Action(MenuAction::Quit),
];

impl MenuAction {
    pub const ALL: [MenuAction; 9] = [
        MenuAction::Show,
        MenuAction::Hide,
        MenuAction::Home,
        MenuAction::ClearWebCache,
        MenuAction::SetNewTrigger,
        MenuAction::InstallAutolauncher,
        MenuAction::UninstallAutolauncher,
        MenuAction::About,
        MenuAction::Quit,
    ];

    pub fn id(self) -> &'static str {
        match self {
            MenuAction::Show => "show",
            MenuAction::Hide => "hide",
            MenuAction::Home => "home",
            MenuAction::ClearWebCache => "clear_web_cache",
            MenuAction::SetNewTrigger => "set_trigger",
            MenuAction::InstallAutolauncher => "install_autolauncher",
            MenuAction::UninstallAutolauncher => "uninstall_autolauncher",
            MenuAction::About => "about",
            MenuAction::Quit => "quit",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.id() == id)
    }

    pub fn label(self, title: &str) -> String {
        match self {
            MenuAction::Show => format!("Show {title}"),
            MenuAction::Hide => format!("Hide {title}"),
            MenuAction::Home => "Home".to_string(),
            MenuAction::ClearWebCache => "Clear Web Cache".to_string(),
            MenuAction::SetNewTrigger => "Set New Trigger".to_string(),
            MenuAction::InstallAutolauncher => "Install Autolauncher".to_string(),
            MenuAction::UninstallAutolauncher => "Uninstall Autolauncher".to_string(),
            MenuAction::About => format!("About {title}"),
            MenuAction::Quit => format!("Quit {title}"),
        }
    }

    pub fn accelerator(self) -> Option<&'static str> {
        match self {
            MenuAction::Hide => Some("CmdOrCtrl+H"),
            MenuAction::Home => Some("CmdOrCtrl+G"),
            MenuAction::Quit => Some("CmdOrCtrl+Q"),
            _ => None,
        }
    }

    pub fn handler(self) -> fn(&AppHandle) {
        match self {
            MenuAction::Show => show_overlay,
            MenuAction::Hide => hide_overlay,
            MenuAction::Home => go_home,
            MenuAction::ClearWebCache => clear_web_cache,
            MenuAction::SetNewTrigger => trigger::open,
            MenuAction::InstallAutolauncher => autostart::install_autolauncher,
            MenuAction::UninstallAutolauncher => autostart::uninstall_autolauncher,
            MenuAction::About => about::show,
            MenuAction::Quit => quit,
        }
    }
}

fn show_overlay(app: &AppHandle) {
    with_controller(app, |c| c.show());
}

fn hide_overlay(app: &AppHandle) {
    with_controller(app, |c| c.hide());
}

fn go_home(app: &AppHandle) {
    if let Some(ctx) = app.try_state::<AppContext>() {
        if let Err(e) = ctx.shell.browser().navigate_home() {
            tracing::warn!("failed to load home page: {e}");
        }
    }
}

fn clear_web_cache(app: &AppHandle) {
    if let Some(ctx) = app.try_state::<AppContext>() {
        let browser = ctx.shell.browser();
        if browser.clear_data() {
            if let Err(e) = browser.reload() {
                tracing::debug!("reload after clearing failed: {e}");
            }
        }
    }
}

fn quit(app: &AppHandle) {
    tracing::info!("quit requested");
    app.exit(0);
}

fn build_menu(app: &AppHandle, title: &str) -> Result<Menu<tauri::Wry>, OverlayError> {
    let menu = Menu::new(app)?;
    for entry in MENU_LAYOUT {
        match entry {
            MenuEntry::Action(action) => {
                let item = MenuItem::with_id(
                    app,
                    action.id(),
                    action.label(title),
                    true,
                    action.accelerator(),
                )?;
                menu.append(&item)?;
            }
            MenuEntry::Separator => menu.append(&PredefinedMenuItem::separator(app)?)?,
        }
    }
    Ok(menu)
}

/// Create the status item with its menu and the icon for `variant`. Menu
/// clicks are routed by the app-wide menu handler.
pub fn setup_tray(app: &AppHandle, title: &str, variant: StatusIconVariant) -> Result<(), OverlayError> {
    let menu = build_menu(app, title)?;

    TrayIconBuilder::with_id(TRAY_ID)
        .icon(variant.image()?)
        .icon_as_template(false)
        .tooltip(title)
        .menu(&menu)
        .show_menu_on_left_click(true)
        .build(app)?;

    tracing::debug!(?variant, "status item created");
    Ok(())
}

pub fn set_icon(app: &AppHandle, variant: StatusIconVariant) -> Result<(), OverlayError> {
    if let Some(tray) = app.tray_by_id(TRAY_ID) {
        tray.set_icon(Some(variant.image()?))?;
        tracing::debug!(?variant, "status icon updated");
    }
    Ok(())
}
