pub mod schema;

#[allow(unused_imports)]
pub use schema::{resolve_config_dir, CompatibilityMode, Config, ProviderEndpointConfig};
