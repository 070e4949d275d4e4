//! CLI command implementations.

pub mod build;
pub mod config;
pub mod init;
pub mod list;
pub mod show;
pub mod verify;

pub use build::build_site;
pub use config::print_config_value;
pub use init::init_site;
pub use list::{list_posts, ListOptions};
pub use show::show_post;
pub use verify::verify_site;
