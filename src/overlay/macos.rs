//! Native NSWindow configuration and the drag-strip mouse monitor.

use block2::RcBlock;
use objc2::runtime::AnyObject;
use objc2::{class, msg_send};
use objc2_app_kit::{NSColor, NSWindow, NSWindowCollectionBehavior, NSWindowStyleMask};
use objc2_foundation::{NSPoint, NSString};
use tauri::window::Window;

use super::layout::{to_top_left, Point, Size};
use super::MouseDisposition;
use crate::config::OverlayConfig;
use crate::error::OverlayError;

/// `NSEventMaskLeftMouseDown`.
const LEFT_MOUSE_DOWN_MASK: u64 = 1 << 1;

fn ns_window(window: &Window) -> Result<&NSWindow, OverlayError> {
    let ptr = window.ns_window()?;
    // Valid for as long as the Tauri window lives.
    Ok(unsafe { &*(ptr as *const NSWindow) })
}

/// Rounded, non-opaque, borderless window that appears on every Space and
/// remembers its frame.
pub fn configure_window(window: &Window, config: &OverlayConfig) -> Result<(), OverlayError> {
    let ns_window = ns_window(window)?;

    unsafe {
        ns_window.setStyleMask(
            NSWindowStyleMask::Borderless
                | NSWindowStyleMask::Resizable
                | NSWindowStyleMask::Miniaturizable,
        );
        ns_window.setCollectionBehavior(
            NSWindowCollectionBehavior::CanJoinAllSpaces | NSWindowCollectionBehavior::Stationary,
        );
        ns_window.setOpaque(false);
        ns_window.setBackgroundColor(Some(&NSColor::clearColor()));
        ns_window.setHasShadow(true);

        let restored = ns_window.setFrameAutosaveName(&NSString::from_str(&config.frame_save_name));
        tracing::debug!(restored, name = %config.frame_save_name, "frame autosave registered");

        if let Some(content) = ns_window.contentView() {
            content.setWantsLayer(true);
            let layer: *mut AnyObject = msg_send![&*content, layer];
            if !layer.is_null() {
                let _: () = msg_send![layer, setCornerRadius: config.corner_radius];
                let _: () = msg_send![layer, setMasksToBounds: true];
            }
        }
    }

    Ok(())
}

/// Watch left mouse-downs delivered to `window`. `on_press` gets the click in
/// top-left content coordinates and the current content size; on
/// `BeginDrag` the window is dragged from this event and the event is
/// consumed.
pub fn install_drag_monitor<F>(window: &Window, on_press: F) -> Result<(), OverlayError>
where
    F: Fn(Point, Size) -> MouseDisposition + 'static,
{
    let target = window.ns_window()? as usize;

    let block = RcBlock::new(move |event: *mut AnyObject| -> *mut AnyObject {
        if event.is_null() {
            return event;
        }
        unsafe {
            let event_window: *mut AnyObject = msg_send![event, window];
            if event_window as usize != target {
                return event;
            }
            let ns_window = &*(target as *const NSWindow);
            let Some(content) = ns_window.contentView() else {
                return event;
            };
            let bounds = content.bounds();
            let location: NSPoint = msg_send![event, locationInWindow];
            let size = Size::new(bounds.size.width, bounds.size.height);
            let point = to_top_left(Point::new(location.x, location.y), size);

            match on_press(point, size) {
                MouseDisposition::BeginDrag => {
                    let _: () = msg_send![ns_window, performWindowDragWithEvent: event];
                    std::ptr::null_mut()
                }
                MouseDisposition::PassThrough => event,
            }
        }
    });

    let monitor: *mut AnyObject = unsafe {
        msg_send![
            class!(NSEvent),
            addLocalMonitorForEventsMatchingMask: LEFT_MOUSE_DOWN_MASK,
            handler: &*block
        ]
    };
    if monitor.is_null() {
        return Err(OverlayError::Config("mouse monitor could not be installed".into()));
    }
    tracing::debug!("drag-strip mouse monitor installed");
    Ok(())
}
