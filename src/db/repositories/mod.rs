pub mod address;
pub mod contact;
pub mod user;
