pub mod apdu;
pub mod card_access;
pub mod security_info;
pub mod util;

pub use apdu::{CommandApdu, ResponseApdu, ResponseCode, StatusWord};
pub use card_access::CardAccess;
pub use security_info::SecurityInfo;
