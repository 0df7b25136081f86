//! Authentication: credentials, prompting and the login protocols.

pub mod coordinator;
pub mod credentials;

pub use coordinator::{AuthenticationCoordinator, LoginScope};
pub use credentials::{
    credential_cache, ConsolePrompt, CredentialCache, CredentialPrompt, Credentials, PromptScope,
};
