/// The unit of data flowing through a graph: a value, or the end of the stream.
///
/// A single subscription observes zero or more `Next` signals followed by at most one `Stop`.
/// Nothing is ever delivered on a subscription after its `Stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal<T> {
    Next(T),
    Stop,
}

impl<T> Signal<T> {
    /// Transforms the payload of a `Next`, passing `Stop` through unchanged
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Signal<U> {
        match self {
            Signal::Next(value) => Signal::Next(f(value)),
            Signal::Stop => Signal::Stop,
        }
    }

    pub fn is_next(&self) -> bool { matches!(self, Signal::Next(_)) }

    pub fn is_stop(&self) -> bool { matches!(self, Signal::Stop) }

    pub fn as_ref(&self) -> Signal<&T> {
        match self {
            Signal::Next(value) => Signal::Next(value),
            Signal::Stop => Signal::Stop,
        }
    }

    /// Returns the payload of a `Next`, or `None` for `Stop`
    pub fn into_next(self) -> Option<T> {
        match self {
            Signal::Next(value) => Some(value),
            Signal::Stop => None,
        }
    }
}

impl<T> From<Option<T>> for Signal<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Signal::Next(value),
            None => Signal::Stop,
        }
    }
}

/// Bound shared by every value that can travel through a graph.
/// Payloads are cloned once per subscriber and hop between execution contexts.
pub trait Payload: Clone + Send + Sync + 'static {}
impl<T> Payload for T where T: Clone + Send + Sync + 'static {}
