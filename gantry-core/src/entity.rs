//! Entity references and the entity-store collaborator
//!
//! A target entity round-trips through a URL parameter as a compact
//! `"{namespace}_{kind}_{id}"` token. The store itself is external; the
//! dispatch layer only resolves, saves and deletes through the
//! [`EntityStore`] trait and never adds transactions or retries of its own.

use crate::Error;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Separator between the namespace, kind and id parts of a reference token.
pub const REF_SEPARATOR: char = '_';

/// A parsed `"{namespace}_{kind}_{id}"` entity reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRef {
    pub namespace: String,
    pub kind: String,
    pub id: String,
}

impl EntityRef {
    pub fn new(
        namespace: impl Into<String>,
        kind: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Parse a reference token.
    ///
    /// The token must split into exactly three non-empty parts; anything
    /// else fails with [`Error::MalformedReference`]. Identifiers therefore
    /// must not themselves contain the separator.
    pub fn parse(token: &str) -> Result<Self, Error> {
        let parts: Vec<&str> = token.split(REF_SEPARATOR).collect();
        if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
            return Err(Error::MalformedReference(token.to_string()));
        }
        Ok(Self::new(parts[0], parts[1], parts[2]))
    }

    /// Encode back into the token form.
    pub fn encode(&self) -> String {
        format!(
            "{}{sep}{}{sep}{}",
            self.namespace,
            self.kind,
            self.id,
            sep = REF_SEPARATOR
        )
    }

    /// Resolve the referenced entity through the store.
    pub async fn resolve(&self, store: &dyn EntityStore) -> Result<Arc<dyn Entity>, Error> {
        store.lookup(&self.namespace, &self.kind, &self.id).await
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

/// A persisted entity, seen through the narrowest possible interface:
/// enough identity to build a reference token, plus a JSON snapshot for
/// template rendering.
pub trait Entity: std::fmt::Debug + Send + Sync {
    fn namespace(&self) -> &str;
    fn kind(&self) -> &str;
    fn id(&self) -> String;

    /// Snapshot used when the entity is placed into a render context.
    fn to_value(&self) -> Value;

    /// Build the reference token for this entity.
    fn entity_ref(&self) -> EntityRef {
        EntityRef::new(self.namespace(), self.kind(), self.id())
    }
}

/// Entity persistence collaborator.
///
/// Failures during save/delete surface as [`Error::Persistence`] and are
/// fatal for the request; a lookup miss is [`Error::EntityNotFound`].
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn lookup(
        &self,
        namespace: &str,
        kind: &str,
        id: &str,
    ) -> Result<Arc<dyn Entity>, Error>;

    async fn save(&self, entity: Arc<dyn Entity>) -> Result<Arc<dyn Entity>, Error>;

    async fn delete(&self, entity: &dyn Entity) -> Result<(), Error>;
}
