pub mod provision;
pub mod resolve;
pub mod seed;
pub mod verify;
