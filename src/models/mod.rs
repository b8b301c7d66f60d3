pub mod address;
pub mod contact;
pub mod user;

pub use address::{AddressDto, AddressPatch, NewAddress};
pub use contact::{ContactDto, ContactPatch, NewContact};
pub use user::{Credentials, LoginResult, NewUser, UserDto, UserPatch};
