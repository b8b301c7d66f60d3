pub mod prelude;

pub mod addresses;
pub mod contacts;
pub mod users;
