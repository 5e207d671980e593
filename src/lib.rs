pub mod definitions;
pub mod secure_messaging;
