//! Protocol object identifiers from BSI TR-03110 part 3 and ICAO Doc 9303 part 11.
//!
//! The protocol OID is the discriminator of every SecurityInfo: it names the record kind as
//! well as the key agreement, mapping and cipher the card offers.

use const_oid::ObjectIdentifier;
use serde::Serialize;
use strum_macros::Display;

/// bsi-de protocols smartcards, the root of every TR-03110 protocol OID.
pub const ID_BSI_PROTOCOLS: ObjectIdentifier = ObjectIdentifier::new_unwrap("0.4.0.127.0.7.2.2");

pub const ID_PK: ObjectIdentifier = ObjectIdentifier::new_unwrap("0.4.0.127.0.7.2.2.1");
pub const ID_PK_DH: ObjectIdentifier = ObjectIdentifier::new_unwrap("0.4.0.127.0.7.2.2.1.1");
pub const ID_PK_ECDH: ObjectIdentifier = ObjectIdentifier::new_unwrap("0.4.0.127.0.7.2.2.1.2");

pub const ID_TA: ObjectIdentifier = ObjectIdentifier::new_unwrap("0.4.0.127.0.7.2.2.2");

pub const ID_CA: ObjectIdentifier = ObjectIdentifier::new_unwrap("0.4.0.127.0.7.2.2.3");
pub const ID_CA_DH_3DES_CBC_CBC: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("0.4.0.127.0.7.2.2.3.1.1");
pub const ID_CA_DH_AES_CBC_CMAC_128: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("0.4.0.127.0.7.2.2.3.1.2");
pub const ID_CA_ECDH_3DES_CBC_CBC: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("0.4.0.127.0.7.2.2.3.2.1");
pub const ID_CA_ECDH_AES_CBC_CMAC_128: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("0.4.0.127.0.7.2.2.3.2.2");
pub const ID_CA_ECDH_AES_CBC_CMAC_256: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("0.4.0.127.0.7.2.2.3.2.4");

pub const ID_PACE: ObjectIdentifier = ObjectIdentifier::new_unwrap("0.4.0.127.0.7.2.2.4");
pub const ID_PACE_DH_GM: ObjectIdentifier = ObjectIdentifier::new_unwrap("0.4.0.127.0.7.2.2.4.1");
pub const ID_PACE_DH_GM_AES_CBC_CMAC_128: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("0.4.0.127.0.7.2.2.4.1.2");
pub const ID_PACE_ECDH_GM: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("0.4.0.127.0.7.2.2.4.2");
pub const ID_PACE_ECDH_GM_3DES_CBC_CBC: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("0.4.0.127.0.7.2.2.4.2.1");
pub const ID_PACE_ECDH_GM_AES_CBC_CMAC_128: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("0.4.0.127.0.7.2.2.4.2.2");
pub const ID_PACE_ECDH_GM_AES_CBC_CMAC_256: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("0.4.0.127.0.7.2.2.4.2.4");
pub const ID_PACE_DH_IM: ObjectIdentifier = ObjectIdentifier::new_unwrap("0.4.0.127.0.7.2.2.4.3");
pub const ID_PACE_ECDH_IM: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("0.4.0.127.0.7.2.2.4.4");
pub const ID_PACE_ECDH_IM_AES_CBC_CMAC_128: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("0.4.0.127.0.7.2.2.4.4.2");
pub const ID_PACE_ECDH_CAM: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("0.4.0.127.0.7.2.2.4.6");
pub const ID_PACE_ECDH_CAM_AES_CBC_CMAC_256: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("0.4.0.127.0.7.2.2.4.6.4");

/// id-icao-mrtd-security-aaProtocolObject
pub const ID_AA: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.23.136.1.1.5");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
pub enum KeyAgreement {
    #[strum(serialize = "DH")]
    Dh,
    #[strum(serialize = "ECDH")]
    Ecdh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
pub enum Mapping {
    #[strum(serialize = "GM")]
    Generic,
    #[strum(serialize = "IM")]
    Integrated,
    #[strum(serialize = "CAM")]
    ChipAuthentication,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
pub enum Cipher {
    #[strum(serialize = "3DES-CBC-CBC")]
    DesEde,
    #[strum(serialize = "AES-CBC-CMAC-128")]
    Aes128,
    #[strum(serialize = "AES-CBC-CMAC-192")]
    Aes192,
    #[strum(serialize = "AES-CBC-CMAC-256")]
    Aes256,
}

impl Cipher {
    fn from_arc(arc: u32) -> Option<Self> {
        match arc {
            1 => Some(Cipher::DesEde),
            2 => Some(Cipher::Aes128),
            3 => Some(Cipher::Aes192),
            4 => Some(Cipher::Aes256),
            _ => None,
        }
    }
}

/// A PACE protocol OID taken apart. `cipher` is absent for the bare mapping OIDs used by
/// PACEDomainParameterInfo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PaceProtocol {
    pub key_agreement: KeyAgreement,
    pub mapping: Mapping,
    pub cipher: Option<Cipher>,
}

impl PaceProtocol {
    pub fn from_oid(oid: &ObjectIdentifier) -> Option<Self> {
        let (mapping_arc, cipher_arc) = match suffix(oid, &ID_PACE)?.as_slice() {
            [m] => (*m, None),
            [m, c] => (*m, Some(*c)),
            _ => return None,
        };
        let (key_agreement, mapping) = match mapping_arc {
            1 => (KeyAgreement::Dh, Mapping::Generic),
            2 => (KeyAgreement::Ecdh, Mapping::Generic),
            3 => (KeyAgreement::Dh, Mapping::Integrated),
            4 => (KeyAgreement::Ecdh, Mapping::Integrated),
            6 => (KeyAgreement::Ecdh, Mapping::ChipAuthentication),
            _ => return None,
        };
        let cipher = match cipher_arc {
            None => None,
            Some(arc) => Some(Cipher::from_arc(arc)?),
        };
        // Chip authentication mapping is only defined for AES.
        if mapping == Mapping::ChipAuthentication && cipher == Some(Cipher::DesEde) {
            return None;
        }
        Some(Self {
            key_agreement,
            mapping,
            cipher,
        })
    }

    /// The name used by TR-03110 for the OID, e.g. `id-PACE-ECDH-GM-AES-CBC-CMAC-128`.
    pub fn name(&self) -> String {
        match self.cipher {
            Some(cipher) => format!("id-PACE-{}-{}-{cipher}", self.key_agreement, self.mapping),
            None => format!("id-PACE-{}-{}", self.key_agreement, self.mapping),
        }
    }
}

/// A chip authentication protocol OID taken apart; always carries a cipher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ChipAuthenticationProtocol {
    pub key_agreement: KeyAgreement,
    pub cipher: Cipher,
}

impl ChipAuthenticationProtocol {
    pub fn from_oid(oid: &ObjectIdentifier) -> Option<Self> {
        let (ka_arc, cipher_arc) = match suffix(oid, &ID_CA)?.as_slice() {
            [k, c] => (*k, *c),
            _ => return None,
        };
        let key_agreement = match ka_arc {
            1 => KeyAgreement::Dh,
            2 => KeyAgreement::Ecdh,
            _ => return None,
        };
        Some(Self {
            key_agreement,
            cipher: Cipher::from_arc(cipher_arc)?,
        })
    }

    pub fn name(&self) -> String {
        format!("id-CA-{}-{}", self.key_agreement, self.cipher)
    }
}

/// The arcs of `oid` following `prefix`, or `None` if `oid` is not below `prefix`.
fn suffix(oid: &ObjectIdentifier, prefix: &ObjectIdentifier) -> Option<Vec<u32>> {
    let mut arcs = oid.arcs();
    for expected in prefix.arcs() {
        if arcs.next()? != expected {
            return None;
        }
    }
    Some(arcs.collect())
}
