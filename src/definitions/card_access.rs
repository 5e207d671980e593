//! EF.CardAccess: the set of SecurityInfos a document publishes before any access control, so
//! that a terminal can pick a PACE variant.

use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::io::{Read, Write};

use der::{Any, Decode, Encode, Length, Reader, SliceReader, Tag, Tagged};
use thiserror::Error;
use tracing::debug;

use crate::definitions::security_info::{PaceDomainParameterInfo, PaceInfo, SecurityInfo};

#[derive(Debug, Error)]
pub enum Error {
    #[error("EF.CardAccess is not a well-formed DER SET")]
    Format(#[from] der::Error),
    #[error("failed to encode EF.CardAccess")]
    Encoding(#[source] der::Error),
    #[error("failed to read or write EF.CardAccess")]
    Io(#[from] std::io::Error),
}

/// The SecurityInfos of EF.CardAccess.
///
/// Members are held as a set: duplicates collapse and the order in which they were decoded is
/// not kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardAccess {
    security_infos: HashSet<SecurityInfo>,
}

impl CardAccess {
    /// Build from an explicit collection of SecurityInfos. An empty collection gives an empty
    /// CardAccess.
    pub fn new(security_infos: impl IntoIterator<Item = SecurityInfo>) -> Self {
        Self {
            security_infos: security_infos.into_iter().collect(),
        }
    }

    /// Decode the contents of EF.CardAccess.
    ///
    /// Elements of the SET that are not recognized as a SecurityInfo are dropped, so the result
    /// may be empty. Anything after the SET is ignored.
    pub fn from_der(bytes: &[u8]) -> Result<Self, Error> {
        let mut reader = SliceReader::new(bytes)?;
        let set: Any = reader.decode()?;
        set.tag().assert_eq(Tag::Set)?;
        if !reader.is_finished() {
            debug!(
                "ignoring {} bytes following EF.CardAccess",
                reader.remaining_len()
            );
        }

        let mut elements = set.value();
        let mut security_infos = HashSet::new();
        while !elements.is_empty() {
            let (element, rest) = split_element(elements)?;
            elements = rest;
            if let Some(info) = SecurityInfo::from_der(element) {
                security_infos.insert(info);
            }
        }
        Ok(Self { security_infos })
    }

    pub fn from_reader(mut reader: impl Read) -> Result<Self, Error> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_der(&bytes)
    }

    /// Encode as a DER SET, members in the iteration order of the underlying set.
    ///
    /// That order is arbitrary: two equal values may encode to different bytes. Use
    /// [`CardAccess::to_der_canonical`] where the output must be byte-stable.
    pub fn to_der(&self) -> Result<Vec<u8>, Error> {
        encode_set(self.encoded_members()?)
    }

    /// Encode as a DER SET OF with members sorted by their encodings.
    pub fn to_der_canonical(&self) -> Result<Vec<u8>, Error> {
        let mut members = self.encoded_members()?;
        members.sort();
        encode_set(members)
    }

    pub fn write_to(&self, mut writer: impl Write) -> Result<(), Error> {
        writer.write_all(&self.to_der()?)?;
        Ok(())
    }

    fn encoded_members(&self) -> Result<Vec<Vec<u8>>, Error> {
        self.security_infos
            .iter()
            .map(|info| info.to_der().map_err(Error::Encoding))
            .collect()
    }

    pub fn security_infos(&self) -> impl Iterator<Item = &SecurityInfo> {
        self.security_infos.iter()
    }

    pub fn pace_infos(&self) -> impl Iterator<Item = &PaceInfo> {
        self.security_infos.iter().filter_map(|info| match info {
            SecurityInfo::Pace(pace) => Some(pace),
            _ => None,
        })
    }

    pub fn pace_domain_parameter_infos(&self) -> impl Iterator<Item = &PaceDomainParameterInfo> {
        self.security_infos.iter().filter_map(|info| match info {
            SecurityInfo::PaceDomainParameter(params) => Some(params),
            _ => None,
        })
    }

    pub fn contains(&self, info: &SecurityInfo) -> bool {
        self.security_infos.contains(info)
    }

    pub fn len(&self) -> usize {
        self.security_infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.security_infos.is_empty()
    }

    /// Order independent hash of the members: `7 * Σ content_hash + 61`, wrapping.
    pub fn content_hash(&self) -> u64 {
        let members = self
            .security_infos
            .iter()
            .fold(0u64, |sum, info| sum.wrapping_add(info.content_hash()));
        members.wrapping_mul(7).wrapping_add(61)
    }
}

impl Hash for CardAccess {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.content_hash().hash(state)
    }
}

impl TryFrom<&[u8]> for CardAccess {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::from_der(bytes)
    }
}

impl fmt::Display for CardAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CardAccess [")?;
        for (i, info) in self.security_infos.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{info}")?;
        }
        write!(f, "]")
    }
}

/// Split the first TLV off `bytes`.
///
/// The tag is walked byte by byte rather than parsed as a `der::Tag`, which cannot hold high tag
/// numbers such as the `7F21` of a card verifiable certificate. Such elements are still
/// skipped over intact.
fn split_element(bytes: &[u8]) -> der::Result<(&[u8], &[u8])> {
    let mut reader = SliceReader::new(bytes)?;
    if reader.read_byte()? & 0x1F == 0x1F {
        while reader.read_byte()? & 0x80 != 0 {}
    }
    let length = Length::decode(&mut reader)?;
    reader.read_slice(length)?;
    let consumed = usize::try_from(reader.position())?;
    Ok(bytes.split_at(consumed))
}

fn encode_set(members: Vec<Vec<u8>>) -> Result<Vec<u8>, Error> {
    Any::new(Tag::Set, members.concat())
        .and_then(|set| set.to_der())
        .map_err(Error::Encoding)
}
