//! Typed observer lists with ordered, short-circuiting dispatch.

use std::fmt;

/// What a handler wants to happen to the rest of the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flow {
    #[default]
    Continue,
    Stop,
}

impl Flow {
    pub fn is_stop(self) -> bool {
        self == Flow::Stop
    }
}

/// Handle returned by [`Event::bind`], used to unbind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

type Handler<T> = Box<dyn FnMut(&T) -> Flow>;

/// A list of handlers for one kind of notification.
pub struct Event<T> {
    handlers: Vec<(HandlerId, Handler<T>)>,
    next_id: u64,
}

impl<T> Default for Event<T> {
    fn default() -> Self {
        Self {
            handlers: Vec::new(),
            next_id: 0,
        }
    }
}

impl<T> fmt::Debug for Event<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl<T> Event<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, handler: impl FnMut(&T) -> Flow + 'static) -> HandlerId {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, Box::new(handler)));
        id
    }

    /// Returns whether the handler was bound.
    pub fn unbind(&mut self, id: HandlerId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(h, _)| *h != id);
        self.handlers.len() != before
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run handlers in bind order until one returns [`Flow::Stop`].
    pub fn trigger(&mut self, payload: &T) -> Flow {
        for (_, handler) in &mut self.handlers {
            if handler(payload).is_stop() {
                return Flow::Stop;
            }
        }
        Flow::Continue
    }
}
