pub mod broker;
pub mod cache;
pub mod microsoft;
pub mod pkce;
pub mod prompt;
pub mod provider;
pub mod store;
pub mod token;

pub use broker::TokenBroker;
pub use cache::{Account, TokenCache};
pub use microsoft::MicrosoftIdentity;
pub use pkce::{generate_pkce, PkceChallenge};
pub use prompt::{extract_authorization_code, ConsolePrompt, UserPrompt};
pub use provider::{DeviceCode, IdentityProvider, ProviderError};
pub use store::CredentialStore;
pub use token::{IdTokenClaims, TokenGrant};
