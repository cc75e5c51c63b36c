//! Flat-string parameter codec
//!
//! Every incoming query parameter except the action name and the entity
//! reference is a flat string. The codec turns those strings into typed
//! JSON values using per-key decoders; keys without a registered decoder
//! pass through unchanged, since handlers choose which kwargs they consume.

use crate::entity::{Entity, EntityRef, EntityStore};
use crate::Error;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Typed decoder applied to a single query key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KwargDecoder {
    /// Identity passthrough (the default for unregistered keys).
    Text,
    Integer,
    Float,
    Boolean,
    /// Comma-separated list of strings.
    List,
}

impl KwargDecoder {
    /// Decode a raw string value, failing with [`Error::ParamDecode`] when
    /// the value does not parse as the registered type.
    pub fn decode(&self, key: &str, raw: &str) -> Result<Value, Error> {
        let decode_err = |message: String| Error::ParamDecode {
            key: key.to_string(),
            message,
        };
        match self {
            KwargDecoder::Text => Ok(Value::String(raw.to_string())),
            KwargDecoder::Integer => raw
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|e| decode_err(e.to_string())),
            KwargDecoder::Float => raw
                .trim()
                .parse::<f64>()
                .map(Value::from)
                .map_err(|e| decode_err(e.to_string())),
            KwargDecoder::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "on" | "yes" => Ok(Value::Bool(true)),
                "false" | "0" | "off" | "no" => Ok(Value::Bool(false)),
                other => Err(decode_err(format!("'{}' is not a boolean", other))),
            },
            KwargDecoder::List => Ok(Value::Array(
                raw.split(',')
                    .map(|part| Value::String(part.trim().to_string()))
                    .collect(),
            )),
        }
    }
}

/// Codec for reconstructing a handler's typed kwargs from flat query
/// strings, and for resolving the optional entity reference token.
#[derive(Debug, Clone, Default)]
pub struct ParamCodec {
    decoders: HashMap<String, KwargDecoder>,
}

impl ParamCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a typed decoder for one key.
    pub fn with_decoder(mut self, key: impl Into<String>, decoder: KwargDecoder) -> Self {
        self.decoders.insert(key.into(), decoder);
        self
    }

    /// Decode query parameters into a typed kwargs map, skipping the
    /// reserved keys (action name, object reference). Unknown keys pass
    /// through as strings.
    pub fn decode_query(
        &self,
        query_params: &HashMap<String, String>,
        skip: &[&str],
    ) -> Result<Map<String, Value>, Error> {
        let mut kwargs = Map::new();
        for (key, raw) in query_params {
            if skip.contains(&key.as_str()) {
                continue;
            }
            let decoder = self.decoders.get(key).copied().unwrap_or(KwargDecoder::Text);
            kwargs.insert(key.clone(), decoder.decode(key, raw)?);
        }
        Ok(kwargs)
    }

    /// Resolve an optional entity reference token.
    ///
    /// An absent token is not an error (the reference is optional per
    /// request); a present but malformed token fails with
    /// [`Error::MalformedReference`], and a well-formed token that resolves
    /// to nothing fails with [`Error::EntityNotFound`].
    pub async fn decode_reference(
        &self,
        token: Option<&str>,
        store: &dyn EntityStore,
    ) -> Result<Option<Arc<dyn Entity>>, Error> {
        match token {
            None => Ok(None),
            Some(raw) => {
                let entity_ref = EntityRef::parse(raw)?;
                Ok(Some(entity_ref.resolve(store).await?))
            }
        }
    }
}
