//! Exchange of command/response APDUs over a card channel, optionally protected by secure
//! messaging, with every exchange reported to the listeners of the card service.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::definitions::apdu::{CommandApdu, ResponseApdu};
use crate::definitions::util::DisplayBytesAsHex;

mod error;
mod event;

pub use error::{Error, SecureMessagingError};
pub use event::{ApduEvent, ApduListener, ApduListeners, Exchange, LoggingListener, PLAIN};

/// The channel to the card, e.g. a PC/SC reader or an NFC connection.
pub trait CardService {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Send one command and wait for its response.
    fn transmit(&self, command: &CommandApdu) -> Result<ResponseApdu, Self::Error>;

    fn is_extended_length_supported(&self) -> bool;

    /// The listeners notified of exchanges on this service.
    fn listeners(&self) -> &ApduListeners;

    fn add_listener(&self, listener: Arc<dyn ApduListener>) {
        self.listeners().add(listener)
    }

    fn remove_listener(&self, listener: &Arc<dyn ApduListener>) -> bool {
        self.listeners().remove(listener)
    }
}

/// Secure messaging state of an established session: protects commands and verifies and
/// decrypts responses. Implementations keep their send sequence counter across calls.
pub trait ApduWrapper {
    fn wrap(&mut self, command: &CommandApdu) -> anyhow::Result<CommandApdu>;

    fn unwrap(&mut self, response: &ResponseApdu) -> anyhow::Result<ResponseApdu>;

    /// Tag reported as the event type of exchanges protected by this wrapper, e.g. `"SM"`.
    fn wrapper_type(&self) -> &str;
}

/// Sends APDUs through a [`CardService`], wrapping them when a secure channel is up.
#[derive(Debug)]
pub struct SecureMessagingSender<S> {
    service: S,
    id: Uuid,
    apdu_count: AtomicU64,
}

impl<S: CardService> SecureMessagingSender<S> {
    pub fn new(service: S) -> Self {
        Self::with_id(service, Uuid::new_v4())
    }

    /// Use `id` as the source of the events this sender produces.
    pub fn with_id(service: S, id: Uuid) -> Self {
        Self {
            service,
            id,
            apdu_count: AtomicU64::new(0),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn into_service(self) -> S {
        self.service
    }

    /// Number of exchanges completed so far, failed unwraps included.
    pub fn apdu_count(&self) -> u64 {
        self.apdu_count.load(Ordering::SeqCst)
    }

    pub fn is_extended_length_supported(&self) -> bool {
        self.service.is_extended_length_supported()
    }

    pub fn add_listener(&self, listener: Arc<dyn ApduListener>) {
        self.service.add_listener(listener)
    }

    pub fn remove_listener(&self, listener: &Arc<dyn ApduListener>) -> bool {
        self.service.remove_listener(listener)
    }

    pub fn listeners(&self) -> &ApduListeners {
        self.service.listeners()
    }

    /// Exchange `command` with the card, protected by `wrapper` if one is given.
    ///
    /// Every exchange that reaches the card produces exactly one event, delivered before this
    /// returns, including when the response cannot be unwrapped. A failure to wrap or to
    /// transmit produces none.
    pub fn transmit(
        &self,
        wrapper: Option<&mut dyn ApduWrapper>,
        command: &CommandApdu,
    ) -> Result<ResponseApdu, Error<S::Error>> {
        let Some(wrapper) = wrapper else {
            let response = self.send(command)?;
            self.notify(|sequence| {
                ApduEvent::new(
                    self.id,
                    PLAIN,
                    sequence,
                    Exchange::Plain {
                        command: command.clone(),
                        response: response.clone(),
                    },
                )
            });
            return Ok(response);
        };

        let wrapped_command = wrapper.wrap(command).map_err(Error::Wrap)?;
        let raw_response = self.send(&wrapped_command)?;
        let outcome = unwrap_response(wrapper, command, &raw_response);
        if let Err(e) = &outcome {
            warn!(
                "secure messaging failure on response with SW={}",
                e.status_word()
            );
            debug!("{e}");
        }

        self.notify(|sequence| {
            ApduEvent::new(
                self.id,
                wrapper.wrapper_type(),
                sequence,
                Exchange::Wrapped {
                    plain_command: command.clone(),
                    plain_response: outcome.as_ref().unwrap_or(&raw_response).clone(),
                    wrapped_command: wrapped_command.clone(),
                    raw_response: raw_response.clone(),
                },
            )
        });

        outcome.map_err(Error::from)
    }

    fn send(&self, command: &CommandApdu) -> Result<ResponseApdu, Error<S::Error>> {
        debug!(
            "sending {}",
            DisplayBytesAsHex::from(command.to_bytes().as_slice())
        );
        let response = self.service.transmit(command).map_err(Error::Transport)?;
        debug!(
            "received {}",
            DisplayBytesAsHex::from(response.to_bytes().as_slice())
        );
        Ok(response)
    }

    /// Count the exchange, then build and deliver its event if anyone is listening.
    fn notify(&self, event: impl FnOnce(u64) -> ApduEvent) {
        let sequence = self.apdu_count.fetch_add(1, Ordering::SeqCst) + 1;
        let listeners = self.service.listeners();
        if listeners.is_empty() {
            return;
        }
        listeners.notify(&event(sequence));
    }
}

fn unwrap_response(
    wrapper: &mut dyn ApduWrapper,
    command: &CommandApdu,
    raw_response: &ResponseApdu,
) -> Result<ResponseApdu, SecureMessagingError> {
    // A bare status word means the card dropped the secure channel.
    if raw_response.encoded_len() <= 2 {
        return Err(SecureMessagingError::NoWrappedPayload {
            command: command.to_bytes().into(),
            status_word: raw_response.sw(),
        });
    }
    wrapper
        .unwrap(raw_response)
        .map_err(|source| SecureMessagingError::UnwrapFailed {
            command: command.to_bytes().into(),
            status_word: raw_response.sw(),
            source,
        })
}
