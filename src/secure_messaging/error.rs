use thiserror::Error;

use crate::definitions::{apdu::StatusWord, util::ByteVecDisplayAsHex};

/// Failure of an exchange through [`SecureMessagingSender`](super::SecureMessagingSender).
///
/// The variants keep apart the three things a caller reacts to differently: the channel broke
/// ([`Error::Transport`], retry), the secure channel broke ([`Error::SecureMessaging`],
/// re-establish it), or the command could not be protected in the first place
/// ([`Error::Wrap`]).
#[derive(Debug, Error)]
pub enum Error<E: std::error::Error + 'static> {
    #[error("transport error")]
    Transport(#[source] E),
    #[error("failed to wrap command APDU")]
    Wrap(#[source] anyhow::Error),
    #[error(transparent)]
    SecureMessaging(#[from] SecureMessagingError),
}

impl<E: std::error::Error + 'static> Error<E> {
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    pub fn is_secure_messaging(&self) -> bool {
        matches!(self, Error::SecureMessaging(_))
    }
}

/// The response to a wrapped command could not be unwrapped.
#[derive(Debug, Error)]
pub enum SecureMessagingError {
    /// The card answered with a bare status word, so there was nothing to unwrap.
    #[error("no wrapped payload received, C={command}, SW={status_word}")]
    NoWrappedPayload {
        command: ByteVecDisplayAsHex,
        status_word: StatusWord,
    },
    /// The wrapper rejected the response, e.g. on a MAC mismatch.
    #[error("failed to unwrap response APDU, C={command}, SW={status_word}")]
    UnwrapFailed {
        command: ByteVecDisplayAsHex,
        status_word: StatusWord,
        #[source]
        source: anyhow::Error,
    },
}

impl SecureMessagingError {
    /// Encoding of the plain command whose response failed.
    pub fn command(&self) -> &[u8] {
        match self {
            Self::NoWrappedPayload { command, .. } | Self::UnwrapFailed { command, .. } => {
                command.as_bytes()
            }
        }
    }

    pub fn status_word(&self) -> StatusWord {
        match self {
            Self::NoWrappedPayload { status_word, .. } | Self::UnwrapFailed { status_word, .. } => {
                *status_word
            }
        }
    }
}
