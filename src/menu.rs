//! Application menu and the app-wide menu event dispatcher.

use tauri::menu::{Menu, MenuItem, PredefinedMenuItem, Submenu};
use tauri::AppHandle;

use crate::about;
use crate::context::with_controller;
use crate::error::OverlayError;
use crate::tray::MenuAction;

/// Prefix keeping application-menu ids apart from status-menu ids.
const APP_MENU_PREFIX: &str = "app-";

/// Key commands available while the overlay is the key window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    SelectAll,
    Copy,
    Cut,
    Paste,
    Hide,
    Quit,
}

impl KeyCommand {
    pub const ALL: [KeyCommand; 6] = [
        KeyCommand::SelectAll,
        KeyCommand::Copy,
        KeyCommand::Cut,
        KeyCommand::Paste,
        KeyCommand::Hide,
        KeyCommand::Quit,
    ];

    pub fn accelerator(self) -> &'static str {
        match self {
            KeyCommand::SelectAll => "CmdOrCtrl+A",
            KeyCommand::Copy => "CmdOrCtrl+C",
            KeyCommand::Cut => "CmdOrCtrl+X",
            KeyCommand::Paste => "CmdOrCtrl+V",
            KeyCommand::Hide => "CmdOrCtrl+H",
            KeyCommand::Quit => "CmdOrCtrl+Q",
        }
    }

    /// Edit commands go to the focused responder through native menu items.
    pub fn is_native(self) -> bool {
        matches!(
            self,
            KeyCommand::SelectAll | KeyCommand::Copy | KeyCommand::Cut | KeyCommand::Paste
        )
    }

    /// Menu id for commands the app handles itself.
    pub fn id(self) -> Option<&'static str> {
        match self {
            KeyCommand::Hide => Some(HIDE_ID),
            KeyCommand::Quit => Some(QUIT_ID),
            _ => None,
        }
    }
}

const ABOUT_ID: &str = "app-about";
const HIDE_ID: &str = "app-hide";
const QUIT_ID: &str = "app-quit";

/// What a menu event id resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuTarget {
    Key(KeyCommand),
    About,
    Status(MenuAction),
}

pub fn resolve(id: &str) -> Option<MenuTarget> {
    if id == ABOUT_ID {
        return Some(MenuTarget::About);
    }
    if id.starts_with(APP_MENU_PREFIX) {
        return KeyCommand::ALL
            .into_iter()
            .find(|k| k.id() == Some(id))
            .map(MenuTarget::Key);
    }
    MenuAction::from_id(id).map(MenuTarget::Status)
}

/// Handle a click on any menu item, status bar or application menu.
pub fn dispatch(app: &AppHandle, id: &str) {
    match resolve(id) {
        Some(MenuTarget::Key(KeyCommand::Hide)) => {
            with_controller(app, |c| c.hide());
        }
        Some(MenuTarget::Key(KeyCommand::Quit)) => app.exit(0),
        Some(MenuTarget::Key(other)) => {
            tracing::debug!(?other, "native key command");
        }
        Some(MenuTarget::About) => about::show(app),
        Some(MenuTarget::Status(action)) => {
            tracing::debug!(?action, "status menu");
            (action.handler())(app);
        }
        None => tracing::debug!(id, "unhandled menu event"),
    }
}

/// Application menu: About, Hide, Hide Others, Show All, Quit, plus an Edit
/// menu carrying the native clipboard commands.
pub fn build_app_menu(app: &AppHandle, title: &str) -> Result<Menu<tauri::Wry>, OverlayError> {
    let app_menu = Submenu::with_items(
        app,
        title,
        true,
        &[
            &MenuItem::with_id(app, ABOUT_ID, format!("About {title}"), true, None::<&str>)?,
            &PredefinedMenuItem::separator(app)?,
            &MenuItem::with_id(
                app,
                HIDE_ID,
                format!("Hide {title}"),
                true,
                Some(KeyCommand::Hide.accelerator()),
            )?,
            &PredefinedMenuItem::hide_others(app, None)?,
            &PredefinedMenuItem::show_all(app, None)?,
            &PredefinedMenuItem::separator(app)?,
            &MenuItem::with_id(
                app,
                QUIT_ID,
                format!("Quit {title}"),
                true,
                Some(KeyCommand::Quit.accelerator()),
            )?,
        ],
    )?;

    let edit_menu = Submenu::with_items(
        app,
        "Edit",
        true,
        &[
            &PredefinedMenuItem::select_all(app, None)?,
            &PredefinedMenuItem::copy(app, None)?,
            &PredefinedMenuItem::cut(app, None)?,
            &PredefinedMenuItem::paste(app, None)?,
        ],
    )?;

    Ok(Menu::with_items(app, &[&app_menu, &edit_menu])?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_commands_are_native() {
        for key in KeyCommand::ALL {
            assert_eq!(key.is_native(), key.id().is_none(), "{key:?}");
        }
    }

    #[test]
    fn accelerators_use_command_or_control() {
        let expected = ["A", "C", "X", "V", "H", "Q"];
        for (key, letter) in KeyCommand::ALL.iter().zip(expected) {
            assert_eq!(key.accelerator(), format!("CmdOrCtrl+{letter}"));
        }
    }

    #[test]
    fn resolves_app_and_status_ids() {
        assert_eq!(resolve("app-hide"), Some(MenuTarget::Key(KeyCommand::Hide)));
        assert_eq!(resolve("app-quit"), Some(MenuTarget::Key(KeyCommand::Quit)));
        assert_eq!(resolve("app-about"), Some(MenuTarget::About));
        assert_eq!(resolve("hide"), Some(MenuTarget::Status(MenuAction::Hide)));
        assert_eq!(resolve("about"), Some(MenuTarget::Status(MenuAction::About)));
        assert_eq!(resolve("app-unknown"), None);
        assert_eq!(resolve(""), None);
    }
}
