use crate::runtime::msg::{Action, Event, Internal};

#[derive(Debug)]
pub enum Msg {
    /// Dispatched by the host through [`Runtime::dispatch`](crate::runtime::Runtime::dispatch).
    Action(Action),
    /// Produced by effects and fed back to the model.
    Internal(Internal),
    /// Forwarded to the host as a core event.
    Event(Event),
}
