pub mod config_gen;
pub mod links;
pub mod reset;
pub mod stats;

pub use config_gen::generate_config;
pub use links::{create_link, delete_link, list_links};
pub use reset::reset_data;
pub use stats::{show_data_count, show_stats};
