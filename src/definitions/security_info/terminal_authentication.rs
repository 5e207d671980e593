use const_oid::ObjectIdentifier;
use der::{asn1::OctetString, Sequence};

/// ```text
/// TerminalAuthenticationInfo ::= SEQUENCE {
///   protocol OBJECT IDENTIFIER(id-TA),
///   version  INTEGER, -- MUST be 1 or 2
///   efCVCA   FileID OPTIONAL
/// }
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct TerminalAuthenticationInfo {
    pub protocol: ObjectIdentifier,
    pub version: u64,
    #[asn1(optional = "true")]
    pub ef_cvca: Option<EfFileId>,
}

/// ```text
/// FileID ::= SEQUENCE {
///   fid  OCTET STRING (SIZE(2)),
///   sfid OCTET STRING (SIZE(1)) OPTIONAL
/// }
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct EfFileId {
    pub fid: OctetString,
    #[asn1(optional = "true")]
    pub sfid: Option<OctetString>,
}

impl EfFileId {
    /// The two byte file identifier, if well formed.
    pub fn file_identifier(&self) -> Option<u16> {
        let fid: [u8; 2] = self.fid.as_bytes().try_into().ok()?;
        Some(u16::from_be_bytes(fid))
    }

    pub fn short_file_identifier(&self) -> Option<u8> {
        match self.sfid.as_ref()?.as_bytes() {
            [sfid] => Some(*sfid),
            _ => None,
        }
    }
}
