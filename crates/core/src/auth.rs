// Bearer credential verification against a single shared secret

use crate::types::{AccessGrant, WILDCARD_SCOPE};
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Client identity stamped on grants when none is configured
pub const DEFAULT_CLIENT_IDENTITY: &str = "gateway-client";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("auth token must not be empty")]
    EmptySecret,

    #[error("client identity must not be empty")]
    EmptyClientIdentity,
}

/// The configured secret and the identity grants are issued against
#[derive(Clone)]
pub struct CredentialStore {
    secret: String,
    client_identity: String,
}

impl CredentialStore {
    /// An empty secret would let an empty bearer header through, so it is rejected here.
    pub fn new(
        secret: impl Into<String>,
        client_identity: impl Into<String>,
    ) -> Result<Self, CredentialError> {
        let secret = secret.into();
        let client_identity = client_identity.into();

        if secret.is_empty() {
            return Err(CredentialError::EmptySecret);
        }
        if client_identity.trim().is_empty() {
            return Err(CredentialError::EmptyClientIdentity);
        }

        Ok(Self {
            secret,
            client_identity,
        })
    }

    pub fn client_identity(&self) -> &str {
        &self.client_identity
    }

    // Length mismatch short-circuits; equal-length inputs compare in constant time.
    fn matches(&self, presented: &str) -> bool {
        self.secret.as_bytes().ct_eq(presented.as_bytes()).into()
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("secret", &"<redacted>")
            .field("client_identity", &self.client_identity)
            .finish()
    }
}

/// Issues access grants for tokens that exactly match the stored secret
#[derive(Debug, Clone)]
pub struct TokenAuthenticator {
    store: Arc<CredentialStore>,
}

impl TokenAuthenticator {
    pub fn new(store: CredentialStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Returns a grant when `presented` equals the secret byte for byte.
    ///
    /// No trimming or case folding is applied. The grant is unrestricted
    /// (`*` scope) and does not expire.
    pub fn authenticate(&self, presented: &str) -> Option<AccessGrant> {
        if !self.store.matches(presented) {
            return None;
        }

        Some(AccessGrant::new(
            presented,
            self.store.client_identity(),
            [WILDCARD_SCOPE.to_string()],
            None,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn authenticator() -> TokenAuthenticator {
        TokenAuthenticator::new(CredentialStore::new("abc123", "gateway-client").unwrap())
    }

    #[test]
    fn test_exact_match_issues_unrestricted_grant() {
        let grant = authenticator().authenticate("abc123").unwrap();

        assert_eq!(grant.token(), "abc123");
        assert_eq!(grant.client_identity(), "gateway-client");
        assert_eq!(grant.scopes().len(), 1);
        assert!(grant.scopes().contains("*"));
        assert!(grant.expires_at().is_none());
    }

    #[test]
    fn test_near_misses_are_rejected() {
        let auth = authenticator();

        for presented in ["", "ABC123", "abc123 ", " abc123", "abc12", "abc1234", "abc123\n"] {
            assert!(
                auth.authenticate(presented).is_none(),
                "token {:?} should not authenticate",
                presented
            );
        }
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        assert_eq!(
            CredentialStore::new("", "gateway-client").unwrap_err(),
            CredentialError::EmptySecret
        );
        assert_eq!(
            CredentialStore::new("abc123", "  ").unwrap_err(),
            CredentialError::EmptyClientIdentity
        );
    }

    #[test]
    fn test_independent_instances() {
        let first = TokenAuthenticator::new(CredentialStore::new("one", "a").unwrap());
        let second = TokenAuthenticator::new(CredentialStore::new("two", "b").unwrap());

        assert!(first.authenticate("one").is_some());
        assert!(first.authenticate("two").is_none());
        assert_eq!(second.authenticate("two").unwrap().client_identity(), "b");
    }

    #[test]
    fn test_debug_never_prints_secret() {
        let store = CredentialStore::new("abc123", "gateway-client").unwrap();
        assert!(!format!("{:?}", store).contains("abc123"));
        assert!(!format!("{:?}", TokenAuthenticator::new(store)).contains("abc123"));
    }

    proptest! {
        #[test]
        fn test_grant_issued_iff_token_equals_secret(
            secret in "\\PC{1,16}",
            presented in prop_oneof![".*", "[a-cA-C1-3 ]{0,8}"],
        ) {
            let auth = TokenAuthenticator::new(CredentialStore::new(secret.clone(), "c").unwrap());

            prop_assert_eq!(auth.authenticate(&presented).is_some(), presented == secret);
            prop_assert!(auth.authenticate(&secret).is_some());
        }

        #[test]
        fn test_one_char_edit_never_authenticates(
            secret in "[a-zA-Z0-9]{1,16}",
            suffix in "\\PC",
        ) {
            let auth = TokenAuthenticator::new(CredentialStore::new(secret.clone(), "c").unwrap());

            let mut truncated = secret.clone();
            truncated.pop();
            prop_assert!(auth.authenticate(&truncated).is_none());
            let appended = format!("{}{}", secret, suffix);
            let prepended = format!("{}{}", suffix, secret);
            prop_assert!(auth.authenticate(&appended).is_none());
            prop_assert!(auth.authenticate(&prepended).is_none());
        }
    }
}
