use serde::{Deserialize, Serialize};

use super::document::ProductIdentity;
use crate::domain::errors::{DomainError, Result};

/// Equality predicate over a document's identity metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum MetadataFilter {
    ProductId(String),
    ProductName(String),
}

impl MetadataFilter {
    /// Payload key the predicate applies to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::ProductId(_) => "product_id",
            Self::ProductName(_) => "product_name",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Self::ProductId(v) | Self::ProductName(v) => v,
        }
    }

    pub fn matches(&self, metadata: &impl ProductIdentity) -> bool {
        match self {
            Self::ProductId(id) => metadata.product_id() == Some(id.as_str()),
            Self::ProductName(name) => metadata.product_name() == Some(name.as_str()),
        }
    }
}

/// A validated product identity used to look up reviews.
///
/// Blank identifiers count as absent; at least one of the two must remain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSelector {
    product_id: Option<String>,
    product_name: Option<String>,
    index_filter: MetadataFilter,
}

impl ProductSelector {
    pub fn new(product_id: Option<String>, product_name: Option<String>) -> Result<Self> {
        let product_id = non_blank(product_id);
        let product_name = non_blank(product_name);

        let index_filter = match (&product_id, &product_name) {
            (Some(id), _) => MetadataFilter::ProductId(id.clone()),
            (None, Some(name)) => MetadataFilter::ProductName(name.clone()),
            (None, None) => {
                return Err(DomainError::invalid_argument(
                    "provide product_id or product_name",
                ))
            }
        };

        Ok(Self {
            product_id,
            product_name,
            index_filter,
        })
    }

    pub fn by_id(product_id: impl Into<String>) -> Result<Self> {
        Self::new(Some(product_id.into()), None)
    }

    pub fn by_name(product_name: impl Into<String>) -> Result<Self> {
        Self::new(None, Some(product_name.into()))
    }

    pub fn product_id(&self) -> Option<&str> {
        self.product_id.as_deref()
    }

    pub fn product_name(&self) -> Option<&str> {
        self.product_name.as_deref()
    }

    /// Text encoded into the query vector. Never used as a filter value.
    pub fn query_text(&self) -> &str {
        self.product_name
            .as_deref()
            .or(self.product_id.as_deref())
            .unwrap_or_default()
    }

    /// Index-side predicate: the id when known, otherwise the name.
    pub fn index_filter(&self) -> &MetadataFilter {
        &self.index_filter
    }

    /// Client-side check: exact match on either supplied identifier.
    pub fn matches(&self, metadata: &impl ProductIdentity) -> bool {
        let id_match = self
            .product_id
            .as_deref()
            .is_some_and(|id| metadata.product_id() == Some(id));
        let name_match = self
            .product_name
            .as_deref()
            .is_some_and(|name| metadata.product_name() == Some(name));
        id_match || name_match
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
