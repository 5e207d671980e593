use const_oid::ObjectIdentifier;
use der::Sequence;
use x509_cert::spki::SubjectPublicKeyInfoOwned;

use super::oid::{ChipAuthenticationProtocol, KeyAgreement, ID_PK_DH, ID_PK_ECDH};

/// ```text
/// ChipAuthenticationInfo ::= SEQUENCE {
///   protocol OBJECT IDENTIFIER(id-CA-DH-* | id-CA-ECDH-*),
///   version  INTEGER, -- MUST be 1 or 2
///   keyId    INTEGER OPTIONAL
/// }
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct ChipAuthenticationInfo {
    pub protocol: ObjectIdentifier,
    pub version: u64,
    #[asn1(optional = "true")]
    pub key_id: Option<u64>,
}

impl ChipAuthenticationInfo {
    pub fn ca_protocol(&self) -> Option<ChipAuthenticationProtocol> {
        ChipAuthenticationProtocol::from_oid(&self.protocol)
    }
}

/// ```text
/// ChipAuthenticationPublicKeyInfo ::= SEQUENCE {
///   protocol                   OBJECT IDENTIFIER(id-PK-DH | id-PK-ECDH),
///   chipAuthenticationPublicKey SubjectPublicKeyInfo,
///   keyId                      INTEGER OPTIONAL
/// }
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct ChipAuthenticationPublicKeyInfo {
    pub protocol: ObjectIdentifier,
    pub public_key: SubjectPublicKeyInfoOwned,
    #[asn1(optional = "true")]
    pub key_id: Option<u64>,
}

impl ChipAuthenticationPublicKeyInfo {
    pub fn key_agreement(&self) -> Option<KeyAgreement> {
        if self.protocol == ID_PK_DH {
            Some(KeyAgreement::Dh)
        } else if self.protocol == ID_PK_ECDH {
            Some(KeyAgreement::Ecdh)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod test {
    use der::{asn1::BitString, Decode, Encode};
    use hex_literal::hex;
    use x509_cert::spki::AlgorithmIdentifierOwned;

    use super::*;
    use crate::definitions::security_info::oid::{Cipher, ID_CA_ECDH_AES_CBC_CMAC_128};

    #[test]
    fn chip_authentication_info() {
        let der = hex!("3012060A04007F00070202030202020102020101");
        let info = ChipAuthenticationInfo::from_der(&der).unwrap();
        assert_eq!(info.protocol, ID_CA_ECDH_AES_CBC_CMAC_128);
        assert_eq!(info.version, 2);
        assert_eq!(info.key_id, Some(1));

        let protocol = info.ca_protocol().unwrap();
        assert_eq!(protocol.key_agreement, KeyAgreement::Ecdh);
        assert_eq!(protocol.cipher, Cipher::Aes128);
        assert_eq!(info.to_der().unwrap(), der);
    }

    #[test]
    fn chip_authentication_public_key_info() {
        let info = ChipAuthenticationPublicKeyInfo {
            protocol: ID_PK_ECDH,
            public_key: SubjectPublicKeyInfoOwned {
                algorithm: AlgorithmIdentifierOwned {
                    oid: ObjectIdentifier::new_unwrap("1.2.840.10045.2.1"),
                    parameters: None,
                },
                subject_public_key: BitString::from_bytes(&hex!("04010203")).unwrap(),
            },
            key_id: None,
        };
        let der = info.to_der().unwrap();
        let decoded = ChipAuthenticationPublicKeyInfo::from_der(&der).unwrap();
        assert_eq!(decoded, info);
        assert_eq!(decoded.key_agreement(), Some(KeyAgreement::Ecdh));
    }
}
