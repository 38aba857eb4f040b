use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ListenerId(pub u64);

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct ListenerOptions {
    /// Capture listeners run before bubble listeners of the same event.
    pub capture: bool,
    /// Removed by the target after its first invocation.
    pub once: bool,
    /// Forwarded to the target as-is. [`EventHub`] has no default action to
    /// suppress, so it stores the flag without acting on it.
    pub passive: bool,
}

pub type Listener<E> = Rc<dyn Fn(&E)>;

/// Anything listeners can be attached to: a window, an element, or an
/// [`EventHub`].
pub trait EventTarget<E> {
    fn add_listener(
        &self,
        event: &str,
        listener: Listener<E>,
        options: ListenerOptions,
    ) -> ListenerId;

    /// Returns whether a listener was actually removed.
    fn remove_listener(&self, event: &str, id: ListenerId) -> bool;
}

impl<E, T> EventTarget<E> for Rc<T>
where
    T: EventTarget<E> + ?Sized,
{
    fn add_listener(
        &self,
        event: &str,
        listener: Listener<E>,
        options: ListenerOptions,
    ) -> ListenerId {
        (**self).add_listener(event, listener, options)
    }

    fn remove_listener(&self, event: &str, id: ListenerId) -> bool {
        (**self).remove_listener(event, id)
    }
}

impl<E, T> EventTarget<E> for &T
where
    T: EventTarget<E> + ?Sized,
{
    fn add_listener(
        &self,
        event: &str,
        listener: Listener<E>,
        options: ListenerOptions,
    ) -> ListenerId {
        (**self).add_listener(event, listener, options)
    }

    fn remove_listener(&self, event: &str, id: ListenerId) -> bool {
        (**self).remove_listener(event, id)
    }
}

/// A listener registration that always forwards to the latest callback.
///
/// Swapping the callback with [`set_callback`](Self::set_callback) does not
/// touch the target. Changing the event name, options or target re-registers.
/// Dropping the binding removes the listener.
pub struct EventBinding<E: 'static, T: EventTarget<E>> {
    target: T,
    event: String,
    options: ListenerOptions,
    callback: Rc<RefCell<Option<Listener<E>>>>,
    id: Option<ListenerId>,
}

impl<E: 'static, T: EventTarget<E>> EventBinding<E, T> {
    pub fn bind(
        target: T,
        event: impl Into<String>,
        options: ListenerOptions,
        callback: impl Fn(&E) + 'static,
    ) -> Self {
        let mut binding = Self {
            target,
            event: event.into(),
            options,
            callback: Rc::new(RefCell::new(Some(Rc::new(callback)))),
            id: None,
        };
        binding.register();
        binding
    }

    pub fn set_callback(&self, callback: impl Fn(&E) + 'static) {
        *self.callback.borrow_mut() = Some(Rc::new(callback));
    }

    /// Keeps the registration but ignores events until a new callback is set.
    pub fn clear_callback(&self) {
        *self.callback.borrow_mut() = None;
    }

    pub fn rebind(&mut self, event: impl Into<String>, options: ListenerOptions) {
        let event = event.into();
        if event == self.event && options == self.options {
            return;
        }
        self.unregister();
        self.event = event;
        self.options = options;
        self.register();
    }

    pub fn retarget(&mut self, target: T) {
        self.unregister();
        self.target = target;
        self.register();
    }

    pub fn event(&self) -> &str {
        &self.event
    }

    pub fn options(&self) -> ListenerOptions {
        self.options
    }

    fn register(&mut self) {
        let slot = self.callback.clone();
        let trampoline: Listener<E> = Rc::new(move |payload: &E| {
            let current = slot.borrow().clone();
            if let Some(callback) = current {
                callback(payload);
            }
        });
        self.id = Some(self.target.add_listener(&self.event, trampoline, self.options));
        tracing::trace!(event = %self.event, "registered event listener");
    }

    fn unregister(&mut self) {
        if let Some(id) = self.id.take() {
            let removed = self.target.remove_listener(&self.event, id);
            tracing::trace!(event = %self.event, removed, "unregistered event listener");
        }
    }
}

impl<E: 'static, T: EventTarget<E>> Drop for EventBinding<E, T> {
    fn drop(&mut self) {
        self.unregister();
    }
}

impl<E: 'static, T: EventTarget<E>> Debug for EventBinding<E, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBinding")
            .field("event", &self.event)
            .field("options", &self.options)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

struct Registration<E> {
    id: ListenerId,
    listener: Listener<E>,
    options: ListenerOptions,
}

/// In-memory [`EventTarget`] for headless use.
pub struct EventHub<E> {
    next_id: Cell<u64>,
    listeners: RefCell<BTreeMap<String, Vec<Registration<E>>>>,
}

impl<E> Default for EventHub<E> {
    fn default() -> Self {
        Self {
            next_id: Cell::new(1),
            listeners: RefCell::new(BTreeMap::new()),
        }
    }
}

impl<E> EventHub<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.borrow().get(event).map_or(0, Vec::len)
    }

    /// Delivers `payload` to every listener of `event` and returns how many ran.
    ///
    /// Listeners may add or remove listeners while running; changes apply
    /// from the next emit on.
    pub fn emit(&self, event: &str, payload: &E) -> usize {
        let mut batch = {
            let mut listeners = self.listeners.borrow_mut();
            let Some(registrations) = listeners.get_mut(event) else {
                return 0;
            };
            let batch = registrations
                .iter()
                .map(|registration| (registration.options.capture, registration.listener.clone()))
                .collect::<Vec<_>>();
            registrations.retain(|registration| !registration.options.once);
            if registrations.is_empty() {
                listeners.remove(event);
            }
            batch
        };
        batch.sort_by_key(|(capture, _)| !*capture);
        for (_, listener) in &batch {
            listener(payload);
        }
        batch.len()
    }
}

impl<E> EventTarget<E> for EventHub<E> {
    fn add_listener(
        &self,
        event: &str,
        listener: Listener<E>,
        options: ListenerOptions,
    ) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners
            .borrow_mut()
            .entry(event.to_string())
            .or_default()
            .push(Registration {
                id,
                listener,
                options,
            });
        id
    }

    fn remove_listener(&self, event: &str, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let Some(registrations) = listeners.get_mut(event) else {
            return false;
        };
        let before = registrations.len();
        registrations.retain(|registration| registration.id != id);
        let removed = registrations.len() != before;
        if registrations.is_empty() {
            listeners.remove(event);
        }
        removed
    }
}

impl<E> Debug for EventHub<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let listeners = self.listeners.borrow();
        f.debug_struct("EventHub")
            .field(
                "events",
                &listeners
                    .iter()
                    .map(|(event, registrations)| (event.as_str(), registrations.len()))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
