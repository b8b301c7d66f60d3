pub use super::addresses::Entity as Addresses;
pub use super::contacts::Entity as Contacts;
pub use super::users::Entity as Users;
