//! The embedded web view hosting the remote site.

use tauri::webview::{Webview, WebviewBuilder};
use tauri::WebviewUrl;
use url::Url;

use crate::config::OverlayConfig;
use crate::error::OverlayError;
use crate::overlay::BROWSER_LABEL;

/// Reports the page background to the backend. Runs in the main frame only and
/// posts only when the resolved color changes.
pub const BACKGROUND_COLOR_SCRIPT: &str = r#"
(function () {
  if (window.top !== window) return;
  var last = null;
  function resolve(el) {
    if (!el) return null;
    var c = getComputedStyle(el).backgroundColor;
    return (!c || c === 'rgba(0, 0, 0, 0)' || c === 'transparent') ? null : c;
  }
  function report() {
    var color = resolve(document.body) || resolve(document.documentElement) || 'rgb(255,255,255)';
    if (color === last) return;
    last = color;
    try {
      var ipc = window.__TAURI_INTERNALS__;
      if (ipc) ipc.invoke('report_background_color', { color: color });
    } catch (e) {}
  }
  document.addEventListener('DOMContentLoaded', function () {
    report();
    new MutationObserver(report).observe(document.documentElement, {
      attributes: true,
      attributeFilter: ['style', 'class'],
      subtree: true,
      childList: true
    });
  });
  window.addEventListener('load', report);
})();
"#;

pub const FOCUS_INPUT_SCRIPT: &str = "document.querySelector('textarea')?.focus();";

/// Placeholder page shown until the first navigation to the home URL.
pub const PLACEHOLDER_PAGE: &str = "index.html";

/// Builder for the browser webview: custom user agent plus the color script.
pub fn webview_builder(config: &OverlayConfig) -> WebviewBuilder<tauri::Wry> {
    WebviewBuilder::new(BROWSER_LABEL, WebviewUrl::App(PLACEHOLDER_PAGE.into()))
        .user_agent(&config.user_agent)
        .initialization_script(BACKGROUND_COLOR_SCRIPT)
}

/// Operations on the hosted page.
#[derive(Clone)]
pub struct BrowserHost {
    webview: Webview,
    home: Url,
}

impl BrowserHost {
    pub fn new(webview: Webview, home: Url) -> Self {
        Self { webview, home }
    }

    pub fn webview(&self) -> &Webview {
        &self.webview
    }

    pub fn navigate_home(&self) -> Result<(), OverlayError> {
        tracing::debug!(url = %self.home, "navigating home");
        self.webview.navigate(self.home.clone())?;
        Ok(())
    }

    pub fn reload(&self) -> Result<(), OverlayError> {
        self.webview.reload()?;
        Ok(())
    }

    /// Remove all website data of the hosted site. The outcome is only logged;
    /// returns whether the store was cleared.
    pub fn clear_data(&self) -> bool {
        match self.webview.clear_all_browsing_data() {
            Ok(()) => {
                tracing::info!("web data cleared");
                true
            }
            Err(e) => {
                tracing::warn!("failed to clear web data: {e}");
                false
            }
        }
    }

    pub fn focus_input(&self) {
        if let Err(e) = self.webview.set_focus() {
            tracing::debug!("browser focus failed: {e}");
        }
        if let Err(e) = self.webview.eval(FOCUS_INPUT_SCRIPT) {
            tracing::debug!("focus script failed: {e}");
        }
    }
}

/// OS-level microphone authorization for this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MicrophoneAccess {
    NotDetermined,
    Restricted,
    Denied,
    Authorized,
}

impl MicrophoneAccess {
    /// Map an `AVAuthorizationStatus` value.
    pub fn from_status(status: isize) -> Option<Self> {
        match status {
            0 => Some(Self::NotDetermined),
            1 => Some(Self::Restricted),
            2 => Some(Self::Denied),
            3 => Some(Self::Authorized),
            _ => None,
        }
    }

    /// Only an undetermined status warrants a prompt.
    pub fn should_prompt(self) -> bool {
        self == Self::NotDetermined
    }
}

/// Ask the OS for microphone access once, so the site's voice mode works
/// without a later prompt. Never blocks.
#[cfg(target_os = "macos")]
pub fn request_microphone_permission() {
    native::request_microphone_permission();
}

#[cfg(not(target_os = "macos"))]
pub fn request_microphone_permission() {
    tracing::debug!("microphone permission is granted by the webview on this platform");
}

#[cfg(target_os = "macos")]
mod native {
    use block2::RcBlock;
    use objc2::runtime::Bool;
    use objc2::{class, msg_send};
    use objc2_foundation::NSString;

    use super::MicrophoneAccess;

    #[link(name = "AVFoundation", kind = "framework")]
    extern "C" {
        static AVMediaTypeAudio: &'static NSString;
    }

    pub fn request_microphone_permission() {
        let media_type: &NSString = unsafe { AVMediaTypeAudio };
        let status: isize = unsafe {
            msg_send![class!(AVCaptureDevice), authorizationStatusForMediaType: media_type]
        };

        match MicrophoneAccess::from_status(status) {
            Some(access) if access.should_prompt() => {
                let handler = RcBlock::new(|granted: Bool| {
                    if granted.as_bool() {
                        tracing::info!("microphone permission granted");
                    } else {
                        tracing::info!("microphone permission denied");
                    }
                });
                let _: () = unsafe {
                    msg_send![
                        class!(AVCaptureDevice),
                        requestAccessForMediaType: media_type,
                        completionHandler: &*handler
                    ]
                };
            }
            Some(MicrophoneAccess::Authorized) => {
                tracing::info!("microphone permission already granted");
            }
            Some(_) => tracing::warn!(
                "microphone permission denied; enable it in System Settings > Privacy & Security > Microphone"
            ),
            None => tracing::warn!(status, "unknown microphone authorization status"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_script_targets_main_frame_and_command() {
        assert!(BACKGROUND_COLOR_SCRIPT.contains("window.top !== window"));
        assert!(BACKGROUND_COLOR_SCRIPT.contains("'report_background_color'"));
        assert!(BACKGROUND_COLOR_SCRIPT.contains("DOMContentLoaded"));
        assert!(BACKGROUND_COLOR_SCRIPT.contains("'load'"));
        assert!(BACKGROUND_COLOR_SCRIPT.contains("MutationObserver"));
    }

    #[test]
    fn color_script_falls_back_to_white() {
        assert!(BACKGROUND_COLOR_SCRIPT.contains("document.body"));
        assert!(BACKGROUND_COLOR_SCRIPT.contains("document.documentElement"));
        assert!(BACKGROUND_COLOR_SCRIPT.contains("'rgb(255,255,255)'"));
    }

    #[test]
    fn focus_script_targets_textarea() {
        assert_eq!(FOCUS_INPUT_SCRIPT, "document.querySelector('textarea')?.focus();");
    }

    #[test]
    fn microphone_status_mapping() {
        assert_eq!(MicrophoneAccess::from_status(0), Some(MicrophoneAccess::NotDetermined));
        assert_eq!(MicrophoneAccess::from_status(3), Some(MicrophoneAccess::Authorized));
        assert_eq!(MicrophoneAccess::from_status(7), None);
        assert!(MicrophoneAccess::NotDetermined.should_prompt());
        assert!(!MicrophoneAccess::Denied.should_prompt());
        assert!(!MicrophoneAccess::Authorized.should_prompt());
    }
}
