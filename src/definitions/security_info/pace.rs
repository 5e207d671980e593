use const_oid::ObjectIdentifier;
use der::Sequence;
use x509_cert::spki::AlgorithmIdentifierOwned;

use super::oid::PaceProtocol;

/// ```text
/// PACEInfo ::= SEQUENCE {
///   protocol    OBJECT IDENTIFIER(id-PACE-*),
///   version     INTEGER, -- SHOULD be 2
///   parameterId INTEGER OPTIONAL
/// }
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct PaceInfo {
    pub protocol: ObjectIdentifier,
    pub version: u64,
    #[asn1(optional = "true")]
    pub parameter_id: Option<u64>,
}

impl PaceInfo {
    pub fn new(protocol: ObjectIdentifier, version: u64, parameter_id: Option<u64>) -> Self {
        Self {
            protocol,
            version,
            parameter_id,
        }
    }

    /// Key agreement, mapping and cipher of this PACE variant.
    ///
    /// Only `None` for a value built by hand with an OID outside id-PACE; decoded values are
    /// always recognized.
    pub fn pace_protocol(&self) -> Option<PaceProtocol> {
        PaceProtocol::from_oid(&self.protocol)
    }

    /// Name of the standardized domain parameters referenced by `parameter_id`, if any.
    pub fn standardized_parameters(&self) -> Option<&'static str> {
        standardized_domain_parameters(self.parameter_id?)
    }
}

/// ```text
/// PACEDomainParameterInfo ::= SEQUENCE {
///   protocol        OBJECT IDENTIFIER(id-PACE-DH-GM | id-PACE-ECDH-GM |
///                                     id-PACE-DH-IM | id-PACE-ECDH-IM | id-PACE-ECDH-CAM),
///   domainParameter AlgorithmIdentifier,
///   parameterId     INTEGER OPTIONAL
/// }
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct PaceDomainParameterInfo {
    pub protocol: ObjectIdentifier,
    pub domain_parameter: AlgorithmIdentifierOwned,
    #[asn1(optional = "true")]
    pub parameter_id: Option<u64>,
}

impl PaceDomainParameterInfo {
    pub fn pace_protocol(&self) -> Option<PaceProtocol> {
        PaceProtocol::from_oid(&self.protocol)
    }
}

/// Standardized domain parameters, TR-03110 part 3 table 4. Identifiers 3-7 and 19-31 are
/// reserved.
pub fn standardized_domain_parameters(parameter_id: u64) -> Option<&'static str> {
    Some(match parameter_id {
        0 => "1024-bit MODP Group with 160-bit Prime Order Subgroup",
        1 => "2048-bit MODP Group with 224-bit Prime Order Subgroup",
        2 => "2048-bit MODP Group with 256-bit Prime Order Subgroup",
        8 => "NIST P-192 (secp192r1)",
        9 => "BrainpoolP192r1",
        10 => "NIST P-224 (secp224r1)",
        11 => "BrainpoolP224r1",
        12 => "NIST P-256 (secp256r1)",
        13 => "BrainpoolP256r1",
        14 => "BrainpoolP320r1",
        15 => "NIST P-384 (secp384r1)",
        16 => "BrainpoolP384r1",
        17 => "BrainpoolP512r1",
        18 => "NIST P-521 (secp521r1)",
        _ => return None,
    })
}

#[cfg(test)]
mod test {
    use der::{Decode, Encode};
    use hex_literal::hex;

    use super::*;
    use crate::definitions::security_info::oid::{
        Cipher, KeyAgreement, Mapping, ID_PACE_ECDH_GM, ID_PACE_ECDH_GM_AES_CBC_CMAC_128,
    };

    #[test]
    fn pace_info() {
        // PACEInfo for ECDH-GM-AES-128 over BrainpoolP256r1, as found on German eID cards
        let der = hex!("3012060A04007F0007020204020202010202010D");
        let info = PaceInfo::from_der(&der).unwrap();
        assert_eq!(info.protocol, ID_PACE_ECDH_GM_AES_CBC_CMAC_128);
        assert_eq!(info.version, 2);
        assert_eq!(info.parameter_id, Some(13));
        assert_eq!(info.standardized_parameters(), Some("BrainpoolP256r1"));

        let protocol = info.pace_protocol().unwrap();
        assert_eq!(protocol.key_agreement, KeyAgreement::Ecdh);
        assert_eq!(protocol.mapping, Mapping::Generic);
        assert_eq!(protocol.cipher, Some(Cipher::Aes128));

        assert_eq!(info.to_der().unwrap(), der);
    }

    #[test]
    fn pace_info_without_parameter_id() {
        let info = PaceInfo::new(ID_PACE_ECDH_GM_AES_CBC_CMAC_128, 2, None);
        let der = info.to_der().unwrap();
        assert_eq!(der, hex!("300F060A04007F00070202040202020102"));
        assert_eq!(PaceInfo::from_der(&der).unwrap(), info);
        assert_eq!(info.standardized_parameters(), None);
    }

    #[test]
    fn pace_domain_parameter_info() {
        // explicit curve parameters left out for brevity
        let info = PaceDomainParameterInfo {
            protocol: ID_PACE_ECDH_GM,
            domain_parameter: AlgorithmIdentifierOwned {
                oid: ObjectIdentifier::new_unwrap("1.2.840.10045.2.1"),
                parameters: None,
            },
            parameter_id: Some(16),
        };
        let der = info.to_der().unwrap();
        let decoded = PaceDomainParameterInfo::from_der(&der).unwrap();
        assert_eq!(decoded, info);
        assert_eq!(decoded.pace_protocol().unwrap().cipher, None);
    }

    #[test]
    fn reserved_parameter_ids() {
        assert_eq!(standardized_domain_parameters(5), None);
        assert_eq!(standardized_domain_parameters(19), None);
        assert_eq!(standardized_domain_parameters(12), Some("NIST P-256 (secp256r1)"));
    }
}
