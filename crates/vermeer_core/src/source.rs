//! Ingested source material.

use crate::{SourceId, SourceItemId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A scraped or ingested item that posts can be generated from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceItem {
    /// Item identifier
    pub id: SourceItemId,
    /// Source the item came from
    pub source_id: SourceId,
    /// Headline or title
    pub title: String,
    /// Body text
    pub body: String,
    /// Original URL, if any
    pub url: Option<String>,
    /// When the item was ingested
    pub ingested_at: DateTime<Utc>,
    /// Whether a post has already been generated from this item
    pub used: bool,
}

impl SourceItem {
    /// Create an unused item ingested at `ingested_at`.
    pub fn new(
        source_id: SourceId,
        title: impl Into<String>,
        body: impl Into<String>,
        ingested_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: SourceItemId::new(),
            source_id,
            title: title.into(),
            body: body.into(),
            url: None,
            ingested_at,
            used: false,
        }
    }
}
