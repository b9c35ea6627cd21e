/// Input event types the engine understands.
/// Generic: no game-specific semantics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A touch/click began at viewport pixels (x, y), y down.
    PointerDown { x: f32, y: f32 },
    /// A touch/click ended at viewport pixels (x, y).
    PointerUp { x: f32, y: f32 },
    /// A touch/cursor moved to viewport pixels (x, y).
    PointerMove { x: f32, y: f32 },
    /// Mouse wheel, in notches. Positive scrolls away from the user (zoom in).
    Wheel { delta: f32 },
    KeyDown { key_code: u32 },
    KeyUp { key_code: u32 },
    /// A custom event from the UI layer (React buttons, sliders, etc.).
    /// `kind` identifies the event type; `a`, `b`, `c` carry arbitrary data.
    Custom { kind: u32, a: f32, b: f32, c: f32 },
}

/// A queue of input events.
/// JS writes events into the queue; Rust reads and drains them each frame.
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Drain all pending events. Returns a Vec and clears the queue.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn iter(&self) -> impl Iterator<Item = &InputEvent> {
        self.events.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_drain() {
        let mut q = InputQueue::new();
        q.push(InputEvent::PointerDown { x: 10.0, y: 20.0 });
        q.push(InputEvent::Wheel { delta: -1.0 });
        assert_eq!(q.len(), 2);
        let events = q.drain();
        assert_eq!(events[1], InputEvent::Wheel { delta: -1.0 });
        assert!(q.is_empty());
    }

    #[test]
    fn custom_event_keeps_payload() {
        let mut q = InputQueue::new();
        q.push(InputEvent::Custom { kind: 99, a: 1920.0, b: 1080.0, c: 0.0 });
        let first = q.iter().next().copied();
        match first {
            Some(InputEvent::Custom { kind, a, b, .. }) => {
                assert_eq!(kind, 99);
                assert_eq!((a, b), (1920.0, 1080.0));
            }
            other => panic!("expected Custom, got {other:?}"),
        }
    }
}
