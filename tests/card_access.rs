use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use anyhow::Result;
use hex_literal::hex;

use mrtd_channel::definitions::card_access::Error;
use mrtd_channel::definitions::security_info::oid::ID_PACE_ECDH_GM_AES_CBC_CMAC_128;
use mrtd_channel::definitions::security_info::PaceInfo;
use mrtd_channel::definitions::{CardAccess, SecurityInfo};

const PACE_INFO: [u8; 20] = hex!("3012060A04007F0007020204020202010202010D");
const CA_INFO: [u8; 20] = hex!("3012060A04007F00070202030202020102020101");
const TA_INFO: [u8; 15] = hex!("300D060804007F0007020202020101");
// a protocol under bsi-de that is not a SecurityInfo kind
const UNKNOWN_INFO: [u8; 15] = hex!("300D060804007F0007020209020101");

fn set_of(members: &[&[u8]]) -> Vec<u8> {
    let body = members.concat();
    assert!(body.len() < 0x80);
    let mut set = vec![0x31, body.len() as u8];
    set.extend_from_slice(&body);
    set
}

fn hash_of(card_access: &CardAccess) -> u64 {
    let mut hasher = DefaultHasher::new();
    card_access.hash(&mut hasher);
    hasher.finish()
}

#[test]
fn round_trip() -> Result<()> {
    let der = set_of(&[&TA_INFO, &CA_INFO, &PACE_INFO]);
    let card_access = CardAccess::from_der(&der)?;
    assert_eq!(card_access.len(), 3);
    assert_eq!(card_access.pace_infos().count(), 1);

    // TA < CA < PACE by encoding, so the canonical form is the input
    assert_eq!(card_access.to_der_canonical()?, der);
    assert_eq!(CardAccess::from_der(&card_access.to_der()?)?, card_access);
    Ok(())
}

#[test]
fn unsupported_element_is_skipped() -> Result<()> {
    let card_access = CardAccess::from_der(&set_of(&[&PACE_INFO, &UNKNOWN_INFO]))?;
    assert_eq!(card_access.len(), 1);
    assert!(card_access.contains(&SecurityInfo::from(PaceInfo::new(
        ID_PACE_ECDH_GM_AES_CBC_CMAC_128,
        2,
        Some(13)
    ))));
    assert_eq!(card_access.to_der()?, set_of(&[&PACE_INFO]));

    let only_unknown = CardAccess::from_der(&set_of(&[&UNKNOWN_INFO, &hex!("020101")]))?;
    assert!(only_unknown.is_empty());
    Ok(())
}

#[test]
fn not_a_set() {
    // a SEQUENCE where the SET belongs
    let sequence = [&[0x30, 0x14][..], &PACE_INFO[..]].concat();
    assert!(matches!(
        CardAccess::from_der(&sequence),
        Err(Error::Format(_))
    ));
    // SET length runs past the input
    assert!(matches!(
        CardAccess::from_der(&hex!("3114301206")),
        Err(Error::Format(_))
    ));
    assert!(matches!(CardAccess::from_der(&[]), Err(Error::Format(_))));
}

#[test]
fn equality_and_hash_ignore_order() -> Result<()> {
    let forward = CardAccess::from_der(&set_of(&[&PACE_INFO, &CA_INFO, &TA_INFO]))?;
    let backward = CardAccess::from_der(&set_of(&[&TA_INFO, &CA_INFO, &PACE_INFO]))?;
    assert_eq!(forward, backward);
    assert_eq!(forward.content_hash(), backward.content_hash());
    assert_eq!(hash_of(&forward), hash_of(&backward));
    assert_eq!(forward.to_der_canonical()?, backward.to_der_canonical()?);

    let infos: Vec<SecurityInfo> = forward.security_infos().cloned().collect();
    let rebuilt = CardAccess::new(infos.into_iter().rev());
    assert_eq!(rebuilt, forward);

    let smaller = CardAccess::from_der(&set_of(&[&PACE_INFO, &CA_INFO]))?;
    assert_ne!(smaller, forward);
    Ok(())
}

#[test]
fn content_hash_formula() -> Result<()> {
    let card_access = CardAccess::from_der(&set_of(&[&PACE_INFO, &CA_INFO, &TA_INFO]))?;
    let members = [&PACE_INFO[..], &CA_INFO[..], &TA_INFO[..]]
        .iter()
        .map(|der| SecurityInfo::from_der(der).map(|info| info.content_hash()))
        .collect::<Option<Vec<u64>>>()
        .expect("every fixture is a SecurityInfo");
    let sum = members.iter().fold(0u64, |acc, h| acc.wrapping_add(*h));
    assert_eq!(
        card_access.content_hash(),
        sum.wrapping_mul(7).wrapping_add(61)
    );

    let empty = CardAccess::from_der(&hex!("3100"))?;
    assert_eq!(empty.content_hash(), 61);
    Ok(())
}

#[test]
fn high_tag_number_element_is_skipped() -> Result<()> {
    // an empty CV certificate body (tag 7F21) next to a PACEInfo
    let card_access = CardAccess::from_der(&set_of(&[&PACE_INFO, &hex!("7F2100")]))?;
    assert_eq!(card_access.len(), 1);
    assert_eq!(card_access.to_der()?, set_of(&[&PACE_INFO]));
    Ok(())
}

#[test]
fn explicit_empty_collection() {
    let card_access = CardAccess::new(Vec::new());
    assert!(card_access.is_empty());
    assert_eq!(card_access, CardAccess::from_der(&hex!("3100")).unwrap());
}

#[test]
fn duplicates_collapse() -> Result<()> {
    let card_access = CardAccess::from_der(&set_of(&[&PACE_INFO, &PACE_INFO]))?;
    assert_eq!(card_access.len(), 1);
    Ok(())
}
