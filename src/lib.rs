pub mod concurrency_resource;
pub mod diagnostics;
pub mod error;
pub mod framework;
pub mod host;
pub mod lambda_concurrency_client;
pub mod provider;
pub mod schema;
pub mod state;
#[cfg(test)]
mod test_support;

pub use error::ProviderError;
pub use host::Host;
pub use provider::LambdaconfigProvider;
