use std::sync::Mutex;

type Handler<T> = Box<dyn Fn(&T) + Send + Sync>;

/// A typed notification channel with explicit subscription.
///
/// Handlers run synchronously, in subscription order, on the thread that
/// calls [`Signal::emit`]. A handler must not subscribe to the signal that is
/// currently invoking it.
pub struct Signal<T> {
    handlers: Mutex<Vec<Handler<T>>>,
}

impl<T> Signal<T> {
    pub fn new() -> Self {
        Self {
            handlers: Mutex::new(Vec::new()),
        }
    }

    pub fn subscribe(&self, handler: impl Fn(&T) + Send + Sync + 'static) {
        match self.handlers.lock() {
            Ok(mut handlers) => handlers.push(Box::new(handler)),
            Err(e) => tracing::error!("signal subscription lost: {e}"),
        }
    }

    pub fn emit(&self, value: &T) {
        match self.handlers.lock() {
            Ok(handlers) => {
                for handler in handlers.iter() {
                    handler(value);
                }
            }
            Err(e) => tracing::error!("signal emit skipped: {e}"),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.lock().map(|h| h.len()).unwrap_or(0)
    }
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}
