//! Caller identity and the request-scoped context handed to the resolver.

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::api::SessionStore;

/// `SecurityContext` carries the caller identity supplied by the identity provider.
///
/// An anonymous context has no subject; resolving an account for it fails with
/// [`crate::TenancyError::NoIdentity`].
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SecurityContext {
    /// Authenticated user making the request, if any.
    subject_id: Option<Uuid>,
}

impl SecurityContext {
    /// Create a new `SecurityContext` builder
    #[must_use]
    pub fn builder() -> SecurityContextBuilder {
        SecurityContextBuilder::default()
    }

    /// Create an anonymous `SecurityContext` with no subject
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Shorthand for an authenticated user context
    #[must_use]
    pub fn for_user(subject_id: Uuid) -> Self {
        Self::builder().subject_id(subject_id).build()
    }

    /// Get the authenticated subject, `None` when anonymous
    #[must_use]
    pub fn subject_id(&self) -> Option<Uuid> {
        self.subject_id
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.subject_id.is_some()
    }
}

#[derive(Default)]
pub struct SecurityContextBuilder {
    subject_id: Option<Uuid>,
}

impl SecurityContextBuilder {
    #[must_use]
    pub fn subject_id(mut self, subject_id: Uuid) -> Self {
        self.subject_id = Some(subject_id);
        self
    }

    #[must_use]
    pub fn build(self) -> SecurityContext {
        SecurityContext {
            subject_id: self.subject_id,
        }
    }
}

/// Request-scoped context passed into every resolver and interceptor call.
///
/// Bundles the caller identity with the session capability that backs the
/// active-account cache. One value per inbound request; cloning is cheap.
#[derive(Clone)]
pub struct RequestContext {
    security: SecurityContext,
    session: Arc<dyn SessionStore>,
}

impl RequestContext {
    #[must_use]
    pub fn new(security: SecurityContext, session: Arc<dyn SessionStore>) -> Self {
        Self { security, session }
    }

    #[must_use]
    pub fn security(&self) -> &SecurityContext {
        &self.security
    }

    #[must_use]
    pub fn session(&self) -> &dyn SessionStore {
        self.session.as_ref()
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("security", &self.security)
            .finish_non_exhaustive()
    }
}
