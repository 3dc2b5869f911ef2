pub mod address;
pub mod message;
pub mod voting_power;
