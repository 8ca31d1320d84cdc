use crate::auth::cache::Account;
use crate::auth::microsoft::MicrosoftIdentity;
use crate::auth::pkce::{generate_pkce, generate_state};
use crate::auth::prompt::{extract_authorization_code, UserPrompt};
use crate::auth::provider::{IdentityProvider, ProviderError};
use crate::auth::store::CredentialStore;
use crate::auth::token::TokenGrant;
use crate::config::{AppConfig, IdentityConfig};
use crate::error::GraphError;
use crate::scopes::ScopeSet;

/// Resolves access tokens for a fixed scope set, silently when it can.
///
/// Each broker owns its credential store and provider; there is no shared
/// global client.
#[derive(Debug)]
pub struct TokenBroker {
    config: IdentityConfig,
    scopes: ScopeSet,
    store: CredentialStore,
    provider: Box<dyn IdentityProvider>,
}

impl TokenBroker {
    /// Create a broker, loading the credential store from the configured path.
    pub fn new(
        config: IdentityConfig,
        scopes: ScopeSet,
        provider: Box<dyn IdentityProvider>,
    ) -> Self {
        let store = CredentialStore::load(config.token_store_path().clone());
        Self {
            config,
            scopes,
            store,
            provider,
        }
    }

    /// Broker backed by the Microsoft identity platform.
    pub fn from_config(config: &AppConfig) -> Self {
        let provider = MicrosoftIdentity::new(&config.identity);
        Self::new(config.identity.clone(), config.scopes(), Box::new(provider))
    }

    pub fn config(&self) -> &IdentityConfig {
        &self.config
    }

    pub fn scopes(&self) -> &ScopeSet {
        &self.scopes
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// The account silent acquisition would use: the first one cached.
    pub fn account(&self) -> Option<&Account> {
        self.store.cache().accounts().first()
    }

    /// Obtain an access token without user interaction.
    ///
    /// `None` covers every failure: no cached account, no refresh token,
    /// a rejected refresh or an unreachable provider.
    pub async fn get_access_token(&mut self) -> Option<String> {
        let Some(account) = self.account().cloned() else {
            tracing::debug!("No cached account; interactive authentication required");
            return None;
        };

        let token = self.acquire_silent(&account).await?;
        if let Err(e) = self.store.save() {
            tracing::warn!("Failed to persist token cache: {e}");
        }
        Some(token)
    }

    pub async fn is_authenticated(&mut self) -> bool {
        self.get_access_token().await.is_some()
    }

    async fn acquire_silent(&mut self, account: &Account) -> Option<String> {
        if let Some(token) = self.store.cache().find_access_token(account, &self.scopes) {
            tracing::trace!("Using cached access token for {}", account.home_account_id);
            return Some(token.to_string());
        }

        let refresh_token = match self.store.cache().refresh_token_for(account) {
            Some(rt) => rt.to_string(),
            None => {
                tracing::debug!("No refresh token for {}", account.home_account_id);
                return None;
            }
        };

        match self
            .provider
            .acquire_by_refresh_token(&refresh_token, &self.scopes)
            .await
        {
            Ok(grant) => {
                tracing::debug!("Refreshed access token for {}", account.home_account_id);
                self.store
                    .cache_mut()
                    .apply_grant(&grant, &self.scopes, Some(account));
                Some(grant.access_token)
            }
            Err(e) => {
                tracing::debug!("Silent token acquisition failed: {e}");
                None
            }
        }
    }

    /// Sign a user in interactively and persist the result.
    ///
    /// Tries the device-code flow first; if the provider cannot start one
    /// for this client, falls back to an authorization-code flow where the
    /// user pastes the code back. Blocks until the flow finishes.
    pub async fn authenticate_interactive(
        &mut self,
        prompt: &mut dyn UserPrompt,
    ) -> Result<Account, GraphError> {
        let grant = match self.provider.initiate_device_flow(&self.scopes).await {
            Ok(device) => {
                prompt.show_device_code(&device);
                self.provider
                    .acquire_by_device_flow(&device)
                    .await
                    .map_err(auth_failed)?
            }
            Err(e) => {
                tracing::info!("Device code flow unavailable ({e}); using authorization code flow");
                self.authorization_code_flow(prompt).await?
            }
        };

        self.store_grant(&grant)
    }

    async fn authorization_code_flow(
        &self,
        prompt: &mut dyn UserPrompt,
    ) -> Result<TokenGrant, GraphError> {
        let pkce = generate_pkce();
        let redirect_uri = self.config.redirect_uri();
        let auth_url = self
            .provider
            .authorization_url(&self.scopes, redirect_uri, &pkce.code_challenge, &generate_state())
            .map_err(auth_failed)?;

        let pasted = prompt.request_authorization_code(&auth_url)?;
        let code = extract_authorization_code(&pasted)?;

        self.provider
            .acquire_by_authorization_code(&code, &self.scopes, redirect_uri, &pkce.code_verifier)
            .await
            .map_err(auth_failed)
    }

    fn store_grant(&mut self, grant: &TokenGrant) -> Result<Account, GraphError> {
        let account = self.store.cache_mut().apply_grant(grant, &self.scopes, None);
        self.store.save()?;
        tracing::info!("Authenticated as {}", account.home_account_id);
        Ok(account)
    }
}

fn auth_failed(e: ProviderError) -> GraphError {
    GraphError::AuthFailed(e.description())
}
