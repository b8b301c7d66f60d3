mod config;
mod user;

pub use config::{cmd_check_config, cmd_init};
pub use user::cmd_create_user;
