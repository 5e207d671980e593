use std::fmt;

use strum_macros::EnumIter;
use thiserror::Error;

// Command and response APDUs as framed by ISO 7816-4 (2005) §5.1.

use crate::definitions::util::{impl_partial_enum, DisplayBytesAsHex, KnownOrRaw};

/// Largest `Nc` expressible with a short Lc field.
pub const SHORT_MAX_NC: usize = 255;
/// Largest `Ne` expressible with a short Le field (encoded as `0x00`).
pub const SHORT_MAX_NE: usize = 256;
/// Largest `Nc` expressible with an extended Lc field.
pub const EXTENDED_MAX_NC: usize = 65535;
/// Largest `Ne` expressible with an extended Le field (encoded as `0x0000`).
pub const EXTENDED_MAX_NE: usize = 65536;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    #[error("command APDU must be at least 4 bytes, got {0}")]
    CommandTooShort(usize),
    #[error("command APDU body does not match any ISO 7816-4 case")]
    MalformedBody,
    #[error("command data of {0} bytes exceeds the extended length limit")]
    DataTooLong(usize),
    #[error("expected response length {0} exceeds the extended length limit")]
    ExpectedLengthTooLarge(usize),
    #[error("response APDU must be at least 2 bytes, got {0}")]
    ResponseTooShort(usize),
}

/// Status words this crate gives a name to.
#[repr(u16)]
#[derive(Debug, EnumIter, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseCode {
    Ok = 0x9000,
    IncorrectLength = 0x6700,
    SecurityStatusNotSatisfied = 0x6982,
    ConditionsNotSatisfied = 0x6985,
    ExpectedSecureMessagingObjectsMissing = 0x6987,
    IncorrectSecureMessagingObjects = 0x6988,
    FileOrApplicationNotFound = 0x6A82,
    IncorrectP1OrP2 = 0x6B00,
    InstructionNotSupported = 0x6D00,
    Unspecified = 0x6F00,
}
impl_partial_enum!(ResponseCode, u16);

impl ResponseCode {
    pub fn to_bytes(self) -> [u8; 2] {
        (self as u16).to_be_bytes()
    }
}

/// The two trailing bytes SW1-SW2 of every response.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusWord(u16);

impl StatusWord {
    pub const fn new(sw: u16) -> Self {
        Self(sw)
    }

    pub fn sw1(&self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn sw2(&self) -> u8 {
        self.0 as u8
    }

    pub fn value(&self) -> u16 {
        self.0
    }

    pub fn code(&self) -> KnownOrRaw<u16, ResponseCode> {
        self.0.into()
    }

    pub fn is_success(&self) -> bool {
        self.0 == ResponseCode::Ok as u16
    }

    pub fn to_bytes(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }
}

impl From<u16> for StatusWord {
    fn from(sw: u16) -> Self {
        Self(sw)
    }
}

impl From<ResponseCode> for StatusWord {
    fn from(code: ResponseCode) -> Self {
        Self(code as u16)
    }
}

impl fmt::Debug for StatusWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code() {
            KnownOrRaw::Known(code) => write!(f, "{:04X} ({code:?})", self.0),
            KnownOrRaw::Unknown(_) => write!(f, "{:04X}", self.0),
        }
    }
}

impl fmt::Display for StatusWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}", self.0)
    }
}

/// A command APDU. `ne` is the maximum number of response bytes expected, zero meaning no
/// response data is expected.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CommandApdu {
    pub cla: u8,
    pub ins: u8,
    pub p1: u8,
    pub p2: u8,
    data: Vec<u8>,
    ne: usize,
}

impl CommandApdu {
    pub fn new(cla: u8, ins: u8, p1: u8, p2: u8, data: Vec<u8>, ne: usize) -> Result<Self, Error> {
        if data.len() > EXTENDED_MAX_NC {
            return Err(Error::DataTooLong(data.len()));
        }
        if ne > EXTENDED_MAX_NE {
            return Err(Error::ExpectedLengthTooLarge(ne));
        }
        Ok(Self {
            cla,
            ins,
            p1,
            p2,
            data,
            ne,
        })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn ne(&self) -> usize {
        self.ne
    }

    /// Whether the encoding needs extended Lc/Le fields.
    pub fn is_extended(&self) -> bool {
        self.data.len() > SHORT_MAX_NC || self.ne > SHORT_MAX_NE
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(4 + 3 + self.data.len() + 3);
        bytes.extend_from_slice(&[self.cla, self.ins, self.p1, self.p2]);

        if self.is_extended() {
            // A single 0x00 introduces the extended fields, whether Lc or Le comes first.
            bytes.push(0x00);
            if !self.data.is_empty() {
                bytes.extend_from_slice(&(self.data.len() as u16).to_be_bytes());
                bytes.extend_from_slice(&self.data);
            }
            if self.ne > 0 {
                // 65536 wraps to 0x0000
                bytes.extend_from_slice(&(self.ne as u16).to_be_bytes());
            }
        } else {
            if !self.data.is_empty() {
                bytes.push(self.data.len() as u8);
                bytes.extend_from_slice(&self.data);
            }
            if self.ne > 0 {
                // 256 wraps to 0x00
                bytes.push(self.ne as u8);
            }
        }
        bytes
    }

    /// Parse any of the four ISO 7816-4 command cases, short or extended.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() < 4 {
            return Err(Error::CommandTooShort(bytes.len()));
        }
        let (header, body) = bytes.split_at(4);
        let (cla, ins, p1, p2) = (header[0], header[1], header[2], header[3]);

        let short_le = |b: u8| if b == 0 { SHORT_MAX_NE } else { b as usize };
        let extended_len = |hi: u8, lo: u8| u16::from_be_bytes([hi, lo]) as usize;
        let extended_le = |hi: u8, lo: u8| match extended_len(hi, lo) {
            0 => EXTENDED_MAX_NE,
            n => n,
        };

        let (data, ne) = match body.len() {
            // Case 1
            0 => (&body[..0], 0),
            // Case 2S
            1 => (&body[..0], short_le(body[0])),
            _ if body[0] != 0 => {
                let nc = body[0] as usize;
                match body.len() - 1 {
                    // Case 3S
                    n if n == nc => (&body[1..], 0),
                    // Case 4S
                    n if n == nc + 1 => (&body[1..1 + nc], short_le(body[1 + nc])),
                    _ => return Err(Error::MalformedBody),
                }
            }
            // Case 2E
            3 => (&body[..0], extended_le(body[1], body[2])),
            n if n > 3 => {
                let nc = extended_len(body[1], body[2]);
                if nc == 0 {
                    return Err(Error::MalformedBody);
                }
                match n - 3 {
                    // Case 3E
                    rest if rest == nc => (&body[3..], 0),
                    // Case 4E
                    rest if rest == nc + 2 => (
                        &body[3..3 + nc],
                        extended_le(body[3 + nc], body[4 + nc]),
                    ),
                    _ => return Err(Error::MalformedBody),
                }
            }
            _ => return Err(Error::MalformedBody),
        };

        Self::new(cla, ins, p1, p2, data.to_vec(), ne)
    }
}

impl fmt::Debug for CommandApdu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C: {}", DisplayBytesAsHex::from(self.to_bytes().as_slice()))
    }
}

/// A response APDU: optional data followed by the status word.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ResponseApdu {
    data: Vec<u8>,
    sw: StatusWord,
}

impl ResponseApdu {
    pub fn new(data: Vec<u8>, sw: impl Into<StatusWord>) -> Self {
        Self {
            data,
            sw: sw.into(),
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn sw(&self) -> StatusWord {
        self.sw
    }

    /// Length of the full encoding, status word included.
    pub fn encoded_len(&self) -> usize {
        self.data.len() + 2
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.encoded_len());
        bytes.extend_from_slice(&self.data);
        bytes.extend_from_slice(&self.sw.to_bytes());
        bytes
    }
}

impl From<ResponseCode> for ResponseApdu {
    fn from(code: ResponseCode) -> Self {
        Self::new(Vec::new(), code)
    }
}

impl From<ResponseApdu> for Vec<u8> {
    fn from(response: ResponseApdu) -> Self {
        response.to_bytes()
    }
}

impl TryFrom<&[u8]> for ResponseApdu {
    type Error = Error;

    fn try_from(response: &[u8]) -> Result<Self, Self::Error> {
        match response.split_last_chunk::<2>() {
            Some((payload, sw)) => Ok(Self::new(payload.to_vec(), u16::from_be_bytes(*sw))),
            None => Err(Error::ResponseTooShort(response.len())),
        }
    }
}

impl fmt::Debug for ResponseApdu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "R: {} SW: {:?}",
            DisplayBytesAsHex::from(self.data.as_slice()),
            self.sw
        )
    }
}
