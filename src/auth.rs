//! Request identity and the access policy.
//!
//! The policy itself is a pure function of (role, operation class): reads
//! require any authenticated identity, writes require an admin. The two
//! denial reasons stay distinct so the transport layer can answer 401 for a
//! missing identity and 403 for an insufficient one.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use thiserror::Error;

/// Privilege level of an authenticated identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Regular,
    Admin,
}

/// The identity attached to a request, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Principal {
    Anonymous,
    Authenticated { role: Role },
}

impl Principal {
    pub fn regular() -> Self {
        Principal::Authenticated {
            role: Role::Regular,
        }
    }

    pub fn admin() -> Self {
        Principal::Authenticated { role: Role::Admin }
    }
}

/// The operations handlers ask the policy about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Retrieve,
    Create,
    Update,
    PartialUpdate,
    Delete,
    UploadImage,
}

impl Operation {
    /// Writes mutate the entity store; reads do not.
    pub fn is_write(self) -> bool {
        !matches!(self, Operation::List | Operation::Retrieve)
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PolicyError {
    #[error("authentication credentials were not provided")]
    Unauthenticated,
    #[error("you do not have permission to perform this action")]
    Forbidden,
}

/// Decides whether `principal` may perform `operation`.
///
/// Pure and synchronous; the rule table is uniform across resource kinds.
pub fn authorize(principal: &Principal, operation: Operation) -> Result<(), PolicyError> {
    match principal {
        Principal::Anonymous => Err(PolicyError::Unauthenticated),
        Principal::Authenticated { role: Role::Admin } => Ok(()),
        Principal::Authenticated {
            role: Role::Regular,
        } => {
            if operation.is_write() {
                Err(PolicyError::Forbidden)
            } else {
                Ok(())
            }
        }
    }
}

/// Static bearer-token registry, loaded from configuration and shared with
/// handlers through an `Extension` layer.
#[derive(Debug, Default, Clone)]
pub struct TokenRegistry {
    tokens: HashMap<String, Role>,
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tokens(admin_tokens: &[String], user_tokens: &[String]) -> Self {
        let mut registry = Self::new();
        for token in user_tokens {
            registry.register(token.clone(), Role::Regular);
        }
        for token in admin_tokens {
            registry.register(token.clone(), Role::Admin);
        }
        registry
    }

    pub fn register(&mut self, token: impl Into<String>, role: Role) {
        self.tokens.insert(token.into(), role);
    }

    /// Resolves a bearer token to a principal. Missing or unknown tokens
    /// yield [`Principal::Anonymous`].
    pub fn principal_for(&self, token: Option<&str>) -> Principal {
        match token.and_then(|t| self.tokens.get(t)) {
            Some(role) => Principal::Authenticated { role: *role },
            None => Principal::Anonymous,
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let principal = parts
            .extensions
            .get::<Arc<TokenRegistry>>()
            .map(|registry| registry.principal_for(bearer_token(&parts.headers)))
            .unwrap_or(Principal::Anonymous);
        Ok(principal)
    }
}
