use const_oid::ObjectIdentifier;
use der::Sequence;

/// ```text
/// ActiveAuthenticationInfo ::= SEQUENCE {
///   protocol           OBJECT IDENTIFIER(id-AA),
///   version            INTEGER, -- MUST be 1
///   signatureAlgorithm OBJECT IDENTIFIER
/// }
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct ActiveAuthenticationInfo {
    pub protocol: ObjectIdentifier,
    pub version: u64,
    pub signature_algorithm: ObjectIdentifier,
}
