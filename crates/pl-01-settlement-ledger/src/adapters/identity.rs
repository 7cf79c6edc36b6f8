//! Static bearer-token verifier.
//!
//! Resolves tokens from a configured table. Every entry is compared on every
//! lookup so response time does not depend on which entry matched.

use crate::domain::errors::IdentityError;
use crate::domain::value_objects::CallerIdentity;
use crate::ports::outbound::CallerVerifier;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::WorkerId;
use std::fmt;

/// One configured token.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TokenGrant {
    pub token: String,
    pub worker_id: WorkerId,
    pub display_name: String,
    #[serde(default = "default_authorized")]
    pub authorized: bool,
}

fn default_authorized() -> bool {
    true
}

impl fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenGrant")
            .field("token", &"<redacted>")
            .field("worker_id", &self.worker_id)
            .field("display_name", &self.display_name)
            .field("authorized", &self.authorized)
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticTokenVerifier {
    grants: Vec<TokenGrant>,
}

impl StaticTokenVerifier {
    pub fn new(grants: Vec<TokenGrant>) -> Self {
        Self { grants }
    }

    pub fn with_grant(
        mut self,
        token: impl Into<String>,
        worker_id: impl Into<WorkerId>,
        display_name: impl Into<String>,
    ) -> Self {
        self.grants.push(TokenGrant {
            token: token.into(),
            worker_id: worker_id.into(),
            display_name: display_name.into(),
            authorized: true,
        });
        self
    }

    /// Register a token whose caller is known but may not submit claims.
    pub fn with_suspended(
        mut self,
        token: impl Into<String>,
        worker_id: impl Into<WorkerId>,
        display_name: impl Into<String>,
    ) -> Self {
        self.grants.push(TokenGrant {
            token: token.into(),
            worker_id: worker_id.into(),
            display_name: display_name.into(),
            authorized: false,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}

#[async_trait]
impl CallerVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<CallerIdentity, IdentityError> {
        let mut matched = None;
        for grant in &self.grants {
            if constant_time_compare(token, &grant.token) && matched.is_none() {
                matched = Some(grant);
            }
        }
        matched
            .map(|grant| CallerIdentity {
                worker_id: grant.worker_id.clone(),
                display_name: grant.display_name.clone(),
                authorized: grant.authorized,
            })
            .ok_or(IdentityError::InvalidToken)
    }
}

/// Constant-time string comparison.
///
/// Both inputs are padded to the longer length with different fill bytes,
/// so differing lengths never compare equal.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    use subtle::ConstantTimeEq;

    let max_len = std::cmp::max(a.len(), b.len());
    let mut a_padded = vec![0u8; max_len];
    let mut b_padded = vec![0xFFu8; max_len];
    a_padded[..a.len()].copy_from_slice(a.as_bytes());
    b_padded[..b.len()].copy_from_slice(b.as_bytes());

    let lengths_equal = a.len().ct_eq(&b.len());
    let contents_equal = a_padded.ct_eq(&b_padded);
    (lengths_equal & contents_equal).into()
}
