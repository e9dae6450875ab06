use parse_display::Display;

/// Error returned by the operations of [`SignalState`](crate::SignalState).
#[non_exhaustive]
#[derive(Display, Debug, Clone, PartialEq, Eq)]
pub enum SignalStateError {
    #[display("signal state is not initialized yet, call `initialize` before using any other methods")]
    NotInitialized,
    #[display("signal state is already initialized")]
    AlreadyInitialized,
    #[display("no trigger registered for field `{field}`, connect it with `connect_streams` first")]
    NoTrigger { field: &'static str },
    #[display("field `{field}` is already connected")]
    AlreadyConnected { field: &'static str },
}

impl std::error::Error for SignalStateError {}

pub type Result<T, E = SignalStateError> = std::result::Result<T, E>;
