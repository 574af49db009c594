use tauri::AppHandle;
use tauri_plugin_autostart::{AutoLaunchManager, ManagerExt};

use crate::error::OverlayError;

/// Registration of the app as a login item.
pub trait LoginItem {
    fn enable(&self) -> Result<(), OverlayError>;

    fn disable(&self) -> Result<(), OverlayError>;

    fn is_enabled(&self) -> Result<bool, OverlayError>;
}

impl LoginItem for AutoLaunchManager {
    fn enable(&self) -> Result<(), OverlayError> {
        AutoLaunchManager::enable(self).map_err(|e| OverlayError::Autostart(e.to_string()))
    }

    fn disable(&self) -> Result<(), OverlayError> {
        AutoLaunchManager::disable(self).map_err(|e| OverlayError::Autostart(e.to_string()))
    }

    fn is_enabled(&self) -> Result<bool, OverlayError> {
        AutoLaunchManager::is_enabled(self).map_err(|e| OverlayError::Autostart(e.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Registered; the running process should hand over to a fresh launch.
    Relaunch,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UninstallOutcome {
    /// Removed; only the window is hidden.
    HideWindow,
    Failed,
}

pub fn install(item: &dyn LoginItem) -> InstallOutcome {
    match item.enable() {
        Ok(()) => {
            tracing::info!("autolauncher installed");
            InstallOutcome::Relaunch
        }
        Err(e) => {
            tracing::warn!("autolauncher install failed: {e}");
            InstallOutcome::Failed
        }
    }
}

pub fn uninstall(item: &dyn LoginItem) -> UninstallOutcome {
    match item.disable() {
        Ok(()) => {
            tracing::info!("autolauncher uninstalled");
            UninstallOutcome::HideWindow
        }
        Err(e) => {
            tracing::warn!("autolauncher uninstall failed: {e}");
            UninstallOutcome::Failed
        }
    }
}

/// Menu action: install, then restart under the login item on success.
pub fn install_autolauncher(app: &AppHandle) {
    let manager = app.autolaunch();
    match install(&*manager) {
        InstallOutcome::Relaunch => app.restart(),
        InstallOutcome::Failed => {}
    }
}

/// Menu action: uninstall, then hide the overlay on success.
pub fn uninstall_autolauncher(app: &AppHandle) {
    let manager = app.autolaunch();
    match uninstall(&*manager) {
        UninstallOutcome::HideWindow => {
            crate::context::with_controller(app, |c| c.hide());
        }
        UninstallOutcome::Failed => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Default)]
    struct FakeLoginItem {
        fail: bool,
        enabled: Cell<bool>,
    }

    impl LoginItem for FakeLoginItem {
        fn enable(&self) -> Result<(), OverlayError> {
            if self.fail {
                return Err(OverlayError::Autostart("launch agent not writable".into()));
            }
            self.enabled.set(true);
            Ok(())
        }

        fn disable(&self) -> Result<(), OverlayError> {
            if self.fail {
                return Err(OverlayError::Autostart("launch agent missing".into()));
            }
            self.enabled.set(false);
            Ok(())
        }

        fn is_enabled(&self) -> Result<bool, OverlayError> {
            Ok(self.enabled.get())
        }
    }

    #[test]
    fn successful_install_requests_relaunch() {
        let item = FakeLoginItem::default();
        assert_eq!(install(&item), InstallOutcome::Relaunch);
        assert!(item.is_enabled().unwrap());
    }

    #[test]
    fn failed_install_keeps_running() {
        let item = FakeLoginItem {
            fail: true,
            ..Default::default()
        };
        assert_eq!(install(&item), InstallOutcome::Failed);
        assert!(!item.is_enabled().unwrap());
    }

    #[test]
    fn successful_uninstall_hides_window() {
        let item = FakeLoginItem::default();
        install(&item);
        assert_eq!(uninstall(&item), UninstallOutcome::HideWindow);
        assert!(!item.is_enabled().unwrap());
    }

    #[test]
    fn failed_uninstall_reports_failure() {
        let item = FakeLoginItem {
            fail: true,
            ..Default::default()
        };
        assert_eq!(uninstall(&item), UninstallOutcome::Failed);
    }
}
