use std::cell::RefCell;

type Subscriber = Box<dyn FnOnce()>;

enum State {
    Waiting(Vec<Subscriber>),
    Fired,
}

/// Fire-once notification that some piece of markup is in the document.
///
/// Subscribing after the signal fired runs the subscriber immediately, so
/// initializers do not depend on the order in which they were wired.
pub struct ReadySignal {
    state: RefCell<State>,
}

impl Default for ReadySignal {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadySignal {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(State::Waiting(Vec::new())),
        }
    }

    #[cfg(test)]
    fn is_fired(&self) -> bool {
        matches!(*self.state.borrow(), State::Fired)
    }

    pub fn subscribe<F: FnOnce() + 'static>(&self, subscriber: F) {
        {
            let mut state = self.state.borrow_mut();
            if let State::Waiting(subscribers) = &mut *state {
                subscribers.push(Box::new(subscriber));
                return;
            }
        }
        subscriber();
    }

    /// Runs all pending subscribers. Later calls are no-ops.
    pub fn fire(&self) {
        let previous = self.state.replace(State::Fired);
        // Borrow is released before running subscribers so they may subscribe again.
        if let State::Waiting(subscribers) = previous {
            for subscriber in subscribers {
                subscriber();
            }
        }
    }
}
