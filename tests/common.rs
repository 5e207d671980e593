use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use mrtd_channel::definitions::{CommandApdu, ResponseApdu};
use mrtd_channel::secure_messaging::{
    ApduEvent, ApduListener, ApduListeners, ApduWrapper, CardService,
};
use thiserror::Error;

#[allow(dead_code)]
fn main() {}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CardError {
    #[error("card removed from the field")]
    CardRemoved,
}

/// A card that answers with scripted responses, in order, and records what it was sent.
#[derive(Default)]
pub struct MockCard {
    responses: Mutex<VecDeque<Result<ResponseApdu, CardError>>>,
    sent: Mutex<Vec<CommandApdu>>,
    extended_length: AtomicBool,
    listeners: ApduListeners,
}

#[allow(dead_code)]
impl MockCard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the response to the next command, given as its hex encoding.
    pub fn respond(self, response: &str) -> Self {
        let bytes = hex::decode(response).expect("invalid hex in scripted response");
        let response =
            ResponseApdu::try_from(bytes.as_slice()).expect("scripted response too short");
        self.responses.lock().unwrap().push_back(Ok(response));
        self
    }

    pub fn fail(self, error: CardError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn set_extended_length(&self, supported: bool) {
        self.extended_length.store(supported, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<CommandApdu> {
        self.sent.lock().unwrap().clone()
    }
}

impl CardService for MockCard {
    type Error = CardError;

    fn transmit(&self, command: &CommandApdu) -> Result<ResponseApdu, Self::Error> {
        self.sent.lock().unwrap().push(command.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted response left")
    }

    fn is_extended_length_supported(&self) -> bool {
        self.extended_length.load(Ordering::SeqCst)
    }

    fn listeners(&self) -> &ApduListeners {
        &self.listeners
    }
}

/// Toy secure messaging: wrapping prepends a `0x87` tag to the command data, unwrapping
/// expects responses whose data opens with `0x99` and strips it.
#[derive(Default)]
pub struct TaggingWrapper {
    pub fail_wrap: bool,
}

pub const WRAPPER_TYPE: &str = "TAGGING";

impl ApduWrapper for TaggingWrapper {
    fn wrap(&mut self, command: &CommandApdu) -> Result<CommandApdu> {
        if self.fail_wrap {
            bail!("session keys not established");
        }
        let mut data = vec![0x87];
        data.extend_from_slice(command.data());
        Ok(CommandApdu::new(
            command.cla | 0x0C,
            command.ins,
            command.p1,
            command.p2,
            data,
            command.ne(),
        )?)
    }

    fn unwrap(&mut self, response: &ResponseApdu) -> Result<ResponseApdu> {
        match response.data().split_first() {
            Some((0x99, rest)) => Ok(ResponseApdu::new(rest.to_vec(), response.sw())),
            _ => bail!("checksum mismatch"),
        }
    }

    fn wrapper_type(&self) -> &str {
        WRAPPER_TYPE
    }
}

/// Keeps every event it is handed.
#[derive(Default)]
pub struct RecordingListener {
    events: Mutex<Vec<ApduEvent>>,
}

#[allow(dead_code)]
impl RecordingListener {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<ApduEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl ApduListener for RecordingListener {
    fn exchanged_apdu(&self, event: &ApduEvent) -> Result<()> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// Parse a command APDU from its hex encoding.
#[allow(dead_code)]
pub fn command(apdu: &str) -> CommandApdu {
    CommandApdu::from_bytes(&hex::decode(apdu).expect("invalid hex in command"))
        .expect("malformed command APDU")
}
