pub mod validation;

pub mod ownership;
pub use ownership::OwnershipGuard;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService};
pub use auth_service_impl::SeaOrmAuthService;

pub mod contact_service;
pub mod contact_service_impl;
pub use contact_service::{AddressService, ContactError, ContactService};
pub use contact_service_impl::SeaOrmContactService;
