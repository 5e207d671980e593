use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::definitions::apdu::{CommandApdu, ResponseApdu};

/// Event type of exchanges that went over the channel unprotected.
pub const PLAIN: &str = "PLAIN";

/// Record of one command/response exchange, handed to every [`ApduListener`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApduEvent {
    source: Uuid,
    event_type: String,
    sequence: u64,
    exchange: Exchange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exchange {
    Plain {
        command: CommandApdu,
        response: ResponseApdu,
    },
    /// `plain_response` is the unwrapped response, or the raw response if unwrapping failed.
    Wrapped {
        plain_command: CommandApdu,
        plain_response: ResponseApdu,
        wrapped_command: CommandApdu,
        raw_response: ResponseApdu,
    },
}

impl ApduEvent {
    pub fn new(
        source: Uuid,
        event_type: impl Into<String>,
        sequence: u64,
        exchange: Exchange,
    ) -> Self {
        Self {
            source,
            event_type: event_type.into(),
            sequence,
            exchange,
        }
    }

    /// Identifier of the sender that performed the exchange.
    pub fn source(&self) -> Uuid {
        self.source
    }

    /// [`PLAIN`], or the type of the wrapper that protected the exchange.
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Position of the exchange in the sender's lifetime, starting at 1.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn exchange(&self) -> &Exchange {
        &self.exchange
    }

    pub fn is_wrapped(&self) -> bool {
        matches!(self.exchange, Exchange::Wrapped { .. })
    }

    /// The command before any wrapping.
    pub fn command(&self) -> &CommandApdu {
        match &self.exchange {
            Exchange::Plain { command, .. } => command,
            Exchange::Wrapped { plain_command, .. } => plain_command,
        }
    }

    /// The response after any unwrapping.
    pub fn response(&self) -> &ResponseApdu {
        match &self.exchange {
            Exchange::Plain { response, .. } => response,
            Exchange::Wrapped { plain_response, .. } => plain_response,
        }
    }

    pub fn wrapped_command(&self) -> Option<&CommandApdu> {
        match &self.exchange {
            Exchange::Plain { .. } => None,
            Exchange::Wrapped {
                wrapped_command, ..
            } => Some(wrapped_command),
        }
    }

    pub fn raw_response(&self) -> Option<&ResponseApdu> {
        match &self.exchange {
            Exchange::Plain { .. } => None,
            Exchange::Wrapped { raw_response, .. } => Some(raw_response),
        }
    }
}

/// Observer of APDU exchanges.
///
/// An error returned by a listener is logged and otherwise ignored; it never fails the exchange
/// nor keeps the event from the listeners registered after it.
pub trait ApduListener: Send + Sync {
    fn exchanged_apdu(&self, event: &ApduEvent) -> anyhow::Result<()>;
}

impl<F> ApduListener for F
where
    F: Fn(&ApduEvent) -> anyhow::Result<()> + Send + Sync,
{
    fn exchanged_apdu(&self, event: &ApduEvent) -> anyhow::Result<()> {
        self(event)
    }
}

/// Listener registry of one card service.
///
/// Listeners are kept in registration order and compared by identity: registering the same
/// `Arc` twice has no effect.
#[derive(Default)]
pub struct ApduListeners {
    listeners: RwLock<Vec<Arc<dyn ApduListener>>>,
}

impl ApduListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, listener: Arc<dyn ApduListener>) {
        let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        if !listeners.iter().any(|l| Arc::ptr_eq(l, &listener)) {
            listeners.push(listener);
        }
    }

    /// Unregister `listener`, returning whether it was registered.
    pub fn remove(&self, listener: &Arc<dyn ApduListener>) -> bool {
        let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|l| !Arc::ptr_eq(l, listener));
        listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The registered listeners, in registration order.
    pub fn snapshot(&self) -> Vec<Arc<dyn ApduListener>> {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Deliver `event` to every listener in registration order.
    ///
    /// The registry lock is released before delivery, so listeners may register or unregister
    /// listeners; such changes take effect from the next event on.
    pub fn notify(&self, event: &ApduEvent) {
        let listeners = self.snapshot();
        for (index, listener) in listeners.iter().enumerate() {
            if let Err(e) = listener.exchanged_apdu(event) {
                warn!(
                    "APDU listener {index} failed on event {}: {e:#}",
                    event.sequence()
                );
            }
        }
    }
}

impl fmt::Debug for ApduListeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApduListeners")
            .field("len", &self.len())
            .finish()
    }
}

/// Writes every exchange to the `debug` log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingListener;

impl ApduListener for LoggingListener {
    fn exchanged_apdu(&self, event: &ApduEvent) -> anyhow::Result<()> {
        match event.exchange() {
            Exchange::Plain { command, response } => {
                debug!(
                    "[{} #{}] {:?} -> {:?}",
                    event.event_type(),
                    event.sequence(),
                    command,
                    response
                );
            }
            Exchange::Wrapped {
                plain_command,
                plain_response,
                wrapped_command,
                raw_response,
            } => {
                debug!(
                    "[{} #{}] {:?} -> {:?} (wrapped {:?} -> {:?})",
                    event.event_type(),
                    event.sequence(),
                    plain_command,
                    plain_response,
                    wrapped_command,
                    raw_response
                );
            }
        }
        Ok(())
    }
}
