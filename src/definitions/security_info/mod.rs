//! SecurityInfo records, the members of EF.CardAccess and EF.CardSecurity.
//!
//! Each record is a SEQUENCE opened by a protocol OBJECT IDENTIFIER. Decoding dispatches on
//! that identifier; anything that is not one of the record kinds below is reported as
//! unrecognized rather than as an error, so that cards advertising newer protocols stay
//! readable.

use std::fmt;
use std::hash::{Hash, Hasher};

use const_oid::ObjectIdentifier;
use der::{Any, Decode, Encode, Reader, SliceReader, Tag, Tagged};
use serde::Serialize;
use sha2::{Digest, Sha256};
use strum_macros::IntoStaticStr;
use tracing::debug;

use crate::definitions::util::DisplayBytesAsHex;

mod active_authentication;
mod chip_authentication;
pub mod oid;
mod pace;
mod terminal_authentication;

pub use active_authentication::ActiveAuthenticationInfo;
pub use chip_authentication::{ChipAuthenticationInfo, ChipAuthenticationPublicKeyInfo};
pub use pace::{standardized_domain_parameters, PaceDomainParameterInfo, PaceInfo};
pub use terminal_authentication::{EfFileId, TerminalAuthenticationInfo};

use oid::{ChipAuthenticationProtocol, PaceProtocol, ID_AA, ID_PK_DH, ID_PK_ECDH, ID_TA};

#[derive(Clone, Debug, PartialEq, Eq, IntoStaticStr)]
pub enum SecurityInfo {
    #[strum(serialize = "PACEInfo")]
    Pace(PaceInfo),
    #[strum(serialize = "PACEDomainParameterInfo")]
    PaceDomainParameter(PaceDomainParameterInfo),
    #[strum(serialize = "ChipAuthenticationInfo")]
    ChipAuthentication(ChipAuthenticationInfo),
    #[strum(serialize = "ChipAuthenticationPublicKeyInfo")]
    ChipAuthenticationPublicKey(ChipAuthenticationPublicKeyInfo),
    #[strum(serialize = "TerminalAuthenticationInfo")]
    TerminalAuthentication(TerminalAuthenticationInfo),
    #[strum(serialize = "ActiveAuthenticationInfo")]
    ActiveAuthentication(ActiveAuthenticationInfo),
}

impl SecurityInfo {
    /// Interpret one DER encoded element as a SecurityInfo.
    ///
    /// Returns `None` when the element is not a record kind this crate supports: an unknown
    /// protocol, a known protocol whose body does not match its ASN.1 definition, or an element
    /// that is not a SEQUENCE at all.
    pub fn from_der(bytes: &[u8]) -> Option<Self> {
        match Self::recognize(bytes) {
            Ok(Some(info)) => {
                debug!("decoded {info}");
                Some(info)
            }
            Ok(None) => {
                debug!(
                    "skipping unsupported SecurityInfo {}",
                    DisplayBytesAsHex::from(bytes)
                );
                None
            }
            Err(e) => {
                debug!(
                    "skipping malformed SecurityInfo {} ({e})",
                    DisplayBytesAsHex::from(bytes)
                );
                None
            }
        }
    }

    fn recognize(bytes: &[u8]) -> der::Result<Option<Self>> {
        let protocol = match leading_protocol(bytes)? {
            Some(protocol) => protocol,
            None => return Ok(None),
        };

        let info = if let Some(pace) = PaceProtocol::from_oid(&protocol) {
            // Cipher-qualified OIDs name a PACE variant, bare mapping OIDs name domain parameters.
            match pace.cipher {
                Some(_) => Self::Pace(PaceInfo::from_der(bytes)?),
                None => Self::PaceDomainParameter(PaceDomainParameterInfo::from_der(bytes)?),
            }
        } else if ChipAuthenticationProtocol::from_oid(&protocol).is_some() {
            Self::ChipAuthentication(ChipAuthenticationInfo::from_der(bytes)?)
        } else if protocol == ID_PK_DH || protocol == ID_PK_ECDH {
            Self::ChipAuthenticationPublicKey(ChipAuthenticationPublicKeyInfo::from_der(bytes)?)
        } else if protocol == ID_TA {
            Self::TerminalAuthentication(TerminalAuthenticationInfo::from_der(bytes)?)
        } else if protocol == ID_AA {
            Self::ActiveAuthentication(ActiveAuthenticationInfo::from_der(bytes)?)
        } else {
            return Ok(None);
        };
        Ok(Some(info))
    }

    pub fn to_der(&self) -> der::Result<Vec<u8>> {
        match self {
            Self::Pace(info) => info.to_der(),
            Self::PaceDomainParameter(info) => info.to_der(),
            Self::ChipAuthentication(info) => info.to_der(),
            Self::ChipAuthenticationPublicKey(info) => info.to_der(),
            Self::TerminalAuthentication(info) => info.to_der(),
            Self::ActiveAuthentication(info) => info.to_der(),
        }
    }

    pub fn protocol(&self) -> &ObjectIdentifier {
        match self {
            Self::Pace(info) => &info.protocol,
            Self::PaceDomainParameter(info) => &info.protocol,
            Self::ChipAuthentication(info) => &info.protocol,
            Self::ChipAuthenticationPublicKey(info) => &info.protocol,
            Self::TerminalAuthentication(info) => &info.protocol,
            Self::ActiveAuthentication(info) => &info.protocol,
        }
    }

    /// ASN.1 type name of the record, e.g. `PACEInfo`.
    pub fn kind(&self) -> &'static str {
        self.into()
    }

    /// TR-03110 / ICAO name of the protocol OID, falling back to dotted notation.
    pub fn protocol_name(&self) -> String {
        let protocol = self.protocol();
        let name = match self {
            Self::Pace(_) | Self::PaceDomainParameter(_) => {
                PaceProtocol::from_oid(protocol).map(|p| p.name())
            }
            Self::ChipAuthentication(_) => {
                ChipAuthenticationProtocol::from_oid(protocol).map(|p| p.name())
            }
            Self::ChipAuthenticationPublicKey(info) => info
                .key_agreement()
                .map(|ka| format!("id-PK-{ka}")),
            Self::TerminalAuthentication(_) => Some("id-TA".to_string()),
            Self::ActiveAuthentication(_) => Some("id-AA".to_string()),
        };
        name.unwrap_or_else(|| protocol.to_string())
    }

    /// Stable 64 bit digest of the DER encoding: the leading eight bytes of its SHA-256,
    /// big-endian. Equal records always have equal content hashes.
    pub fn content_hash(&self) -> u64 {
        let digest = match self.to_der() {
            Ok(der) => Sha256::digest(der),
            Err(_) => Sha256::digest(self.protocol().as_bytes()),
        };
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        u64::from_be_bytes(prefix)
    }

    pub fn summary(&self) -> Summary {
        let (version, parameter_id, key_id) = match self {
            Self::Pace(info) => (Some(info.version), info.parameter_id, None),
            Self::PaceDomainParameter(info) => (None, info.parameter_id, None),
            Self::ChipAuthentication(info) => (Some(info.version), None, info.key_id),
            Self::ChipAuthenticationPublicKey(info) => (None, None, info.key_id),
            Self::TerminalAuthentication(info) => (Some(info.version), None, None),
            Self::ActiveAuthentication(info) => (Some(info.version), None, None),
        };
        Summary {
            kind: self.kind(),
            protocol: self.protocol().to_string(),
            protocol_name: self.protocol_name(),
            version,
            parameter_id,
            domain_parameters: parameter_id.and_then(standardized_domain_parameters),
            key_id,
        }
    }
}

impl Hash for SecurityInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.content_hash().hash(state)
    }
}

impl fmt::Display for SecurityInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.kind(), self.protocol_name())
    }
}

macro_rules! impl_from_info {
    ($info:ty, $variant:ident) => {
        impl From<$info> for SecurityInfo {
            fn from(info: $info) -> Self {
                SecurityInfo::$variant(info)
            }
        }
    };
}

impl_from_info!(PaceInfo, Pace);
impl_from_info!(PaceDomainParameterInfo, PaceDomainParameter);
impl_from_info!(ChipAuthenticationInfo, ChipAuthentication);
impl_from_info!(ChipAuthenticationPublicKeyInfo, ChipAuthenticationPublicKey);
impl_from_info!(TerminalAuthenticationInfo, TerminalAuthentication);
impl_from_info!(ActiveAuthenticationInfo, ActiveAuthentication);

/// Flattened, serializable view of a SecurityInfo.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub kind: &'static str,
    pub protocol: String,
    pub protocol_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_parameters: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_id: Option<u64>,
}

/// The OBJECT IDENTIFIER opening a SEQUENCE, or `None` if the element has another shape.
fn leading_protocol(bytes: &[u8]) -> der::Result<Option<ObjectIdentifier>> {
    let element = Any::from_der(bytes)?;
    if element.tag() != Tag::Sequence {
        return Ok(None);
    }
    let mut reader = SliceReader::new(element.value())?;
    if reader.is_finished() || reader.peek_tag()? != Tag::ObjectIdentifier {
        return Ok(None);
    }
    Ok(Some(reader.decode()?))
}
