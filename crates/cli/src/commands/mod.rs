pub mod edit_config;
pub mod run;
pub mod show_config;
pub mod validate_config;
