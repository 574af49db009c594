//! Keeps the status-bar icon readable against the menu-bar appearance.

use tauri::image::Image;
use tauri::tray::TrayIcon;
use tauri::Theme;

use crate::error::OverlayError;

static TRAY_LIGHT_ICON: &[u8] = include_bytes!("../icons/tray-light.png");
static TRAY_DARK_ICON: &[u8] = include_bytes!("../icons/tray-dark.png");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Appearance {
    Light,
    Dark,
}

impl From<Theme> for Appearance {
    fn from(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Appearance::Dark,
            _ => Appearance::Light,
        }
    }
}

/// Appearance names offered to `bestMatchFromAppearancesWithNames:`.
pub const AQUA: &str = "NSAppearanceNameAqua";
pub const DARK_AQUA: &str = "NSAppearanceNameDarkAqua";

impl Appearance {
    /// Interpret the best-matching appearance name; no match means light.
    pub fn from_appearance_name(name: Option<&str>) -> Self {
        match name {
            Some(DARK_AQUA) => Appearance::Dark,
            _ => Appearance::Light,
        }
    }
}

/// Which logo the status item shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusIconVariant {
    /// White logo, for dark menu bars.
    LightIcon,
    /// Black logo, for light menu bars.
    DarkIcon,
}

impl StatusIconVariant {
    pub fn for_appearance(appearance: Appearance) -> Self {
        match appearance {
            Appearance::Dark => StatusIconVariant::LightIcon,
            Appearance::Light => StatusIconVariant::DarkIcon,
        }
    }

    pub fn png(self) -> &'static [u8] {
        match self {
            StatusIconVariant::LightIcon => TRAY_LIGHT_ICON,
            StatusIconVariant::DarkIcon => TRAY_DARK_ICON,
        }
    }

    pub fn image(self) -> Result<Image<'static>, OverlayError> {
        Ok(Image::from_bytes(self.png())?)
    }
}

/// Tracks the installed variant so redundant updates are skipped.
#[derive(Debug)]
pub struct StatusIconSync {
    current: StatusIconVariant,
}

impl StatusIconSync {
    pub fn new(appearance: Appearance) -> Self {
        Self {
            current: StatusIconVariant::for_appearance(appearance),
        }
    }

    pub fn current(&self) -> StatusIconVariant {
        self.current
    }

    /// Returns the variant to install, or `None` when it is already showing.
    pub fn apply(&mut self, appearance: Appearance) -> Option<StatusIconVariant> {
        let wanted = StatusIconVariant::for_appearance(appearance);
        if wanted == self.current {
            return None;
        }
        self.current = wanted;
        Some(wanted)
    }
}

/// Report the appearance of the status item's button now and whenever it
/// changes. The menu bar can differ from the system theme, so the button is
/// the source of truth.
#[cfg(target_os = "macos")]
pub fn observe_status_item(
    tray: &TrayIcon,
    on_change: impl Fn(Appearance) + 'static,
) -> Result<(), OverlayError> {
    let item = tray.with_inner_tray_icon(|inner| {
        inner
            .ns_status_item()
            .map(|item| objc2::rc::Retained::as_ptr(&item) as usize)
    })?;
    let item = item.ok_or_else(|| OverlayError::Config("status item not created".into()))?;
    native::observe(item, on_change)
}

#[cfg(not(target_os = "macos"))]
pub fn observe_status_item(
    _tray: &TrayIcon,
    _on_change: impl Fn(Appearance) + 'static,
) -> Result<(), OverlayError> {
    tracing::debug!("status icon follows window theme events on this platform");
    Ok(())
}

#[cfg(target_os = "macos")]
mod native {
    use std::ffi::c_void;
    use std::rc::Rc;

    use block2::RcBlock;
    use objc2::rc::Retained;
    use objc2::runtime::{AnyObject, NSObject};
    use objc2::{class, define_class, msg_send, DefinedClass, MainThreadMarker, MainThreadOnly};
    use objc2_foundation::{NSArray, NSString};

    use super::{Appearance, AQUA, DARK_AQUA};
    use crate::error::OverlayError;

    const KEY_PATH: &str = "effectiveAppearance";
    const THEME_CHANGED: &str = "AppleInterfaceThemeChangedNotification";
    /// `NSKeyValueObservingOptionNew`.
    const OBSERVE_NEW: usize = 0x01;

    struct ObserverIvars {
        on_change: Box<dyn Fn()>,
    }

    define_class!(
        // SAFETY: NSObject has no subclassing requirements; no Drop impl.
        #[unsafe(super(NSObject))]
        #[thread_kind = MainThreadOnly]
        #[name = "GrokStatusItemAppearanceObserver"]
        #[ivars = ObserverIvars]
        struct AppearanceObserver;

        impl AppearanceObserver {
            #[unsafe(method(observeValueForKeyPath:ofObject:change:context:))]
            fn observe_value(
                &self,
                _key_path: *mut NSString,
                _object: *mut AnyObject,
                _change: *mut AnyObject,
                _context: *mut c_void,
            ) {
                (self.ivars().on_change)();
            }
        }
    );

    impl AppearanceObserver {
        fn new(mtm: MainThreadMarker, on_change: Box<dyn Fn()>) -> Retained<Self> {
            let this = mtm.alloc::<Self>().set_ivars(ObserverIvars { on_change });
            unsafe { msg_send![super(this), init] }
        }
    }

    fn button(item: usize) -> *mut AnyObject {
        unsafe { msg_send![item as *mut AnyObject, button] }
    }

    /// Light or dark, as the status item's button currently draws.
    fn button_appearance(item: usize) -> Appearance {
        let button = button(item);
        if button.is_null() {
            return Appearance::Light;
        }
        let names = NSArray::from_retained_slice(&[
            NSString::from_str(AQUA),
            NSString::from_str(DARK_AQUA),
        ]);
        let best = unsafe {
            let appearance: *mut AnyObject = msg_send![button, effectiveAppearance];
            if appearance.is_null() {
                return Appearance::Light;
            }
            let best: *mut NSString =
                msg_send![appearance, bestMatchFromAppearancesWithNames: &*names];
            best.as_ref().map(|name| name.to_string())
        };
        Appearance::from_appearance_name(best.as_deref())
    }

    pub fn observe(item: usize, on_change: impl Fn(Appearance) + 'static) -> Result<(), OverlayError> {
        let mtm = MainThreadMarker::new().ok_or_else(|| {
            OverlayError::Config("status item appearance must be observed on the main thread".into())
        })?;
        let button = button(item);
        if button.is_null() {
            return Err(OverlayError::Config("status item has no button".into()));
        }

        let on_change: Rc<dyn Fn(Appearance)> = Rc::new(on_change);
        on_change(button_appearance(item));

        let kvo_change = on_change.clone();
        let observer =
            AppearanceObserver::new(mtm, Box::new(move || kvo_change(button_appearance(item))));
        let key = NSString::from_str(KEY_PATH);
        unsafe {
            let _: () = msg_send![
                button,
                addObserver: &*observer,
                forKeyPath: &*key,
                options: OBSERVE_NEW,
                context: std::ptr::null_mut::<c_void>()
            ];
        }
        // Observes for the rest of the process.
        std::mem::forget(observer);

        // A system theme switch re-reads the button as well.
        let block = RcBlock::new(move |_note: *mut AnyObject| {
            on_change(button_appearance(item));
        });
        let name = NSString::from_str(THEME_CHANGED);
        unsafe {
            let center: *mut AnyObject =
                msg_send![class!(NSDistributedNotificationCenter), defaultCenter];
            let queue: *mut AnyObject = msg_send![class!(NSOperationQueue), mainQueue];
            let _observer: *mut AnyObject = msg_send![
                center,
                addObserverForName: &*name,
                object: std::ptr::null_mut::<AnyObject>(),
                queue: queue,
                usingBlock: &*block
            ];
        }
        tracing::debug!("observing status item appearance");
        Ok(())
    }
}
