mod event;
mod hover;

pub use event::{EventBinding, EventHub, EventTarget, Listener, ListenerId, ListenerOptions};
pub use hover::{HoverBinders, HoverHandler, HoverState};
