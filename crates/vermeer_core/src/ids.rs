//! Strongly typed identifiers.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            Serialize,
            Deserialize,
            derive_more::Display,
            derive_more::From,
        )]
        #[display("{}", _0)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// The underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

uuid_id!(
    /// Identifies a content plan.
    PlanId
);
uuid_id!(
    /// Identifies a post.
    PostId
);
uuid_id!(
    /// Identifies a publishing channel.
    ChannelId
);
uuid_id!(
    /// Identifies a source (feed, scraper target) that yields items.
    SourceId
);
uuid_id!(
    /// Identifies a single ingested source item.
    SourceItemId
);

/// Transport-assigned identifier of a sent message.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display, derive_more::From,
)]
#[display("{}", _0)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Wrap a transport message id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifies the reviewer conversation a callback or text reply came from.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display, derive_more::From,
)]
#[display("{}", _0)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    /// Wrap a transport conversation id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
