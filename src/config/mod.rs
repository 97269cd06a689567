#[cfg(feature = "cli")]
pub mod cli;
pub mod request;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliArgs;
pub use request::RequestFile;
pub use toml_config::AppConfig;
