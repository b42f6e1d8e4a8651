use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum EventFilter {
    Insert,
    Update,
    Delete,
    Any,
}

impl EventFilter {
    pub fn matches(&self, kind: ChangeKind) -> bool {
        match self {
            EventFilter::Any => true,
            EventFilter::Insert => kind == ChangeKind::Insert,
            EventFilter::Update => kind == ChangeKind::Update,
            EventFilter::Delete => kind == ChangeKind::Delete,
        }
    }
}

/// Column image of a changed `posts` or `post_likes` row.
/// For updates this is the new image, for deletes the removed one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowImage {
    // record ids arrive as database things, the key is filled in by the feed
    #[serde(skip_deserializing)]
    pub id: Option<String>,
    pub post_id: Option<String>,
    pub user_id: Option<String>,
    pub likes: Option<i64>,
}

impl RowImage {
    pub fn column(&self, name: &str) -> Option<String> {
        match name {
            "id" => self.id.clone(),
            "post_id" => self.post_id.clone(),
            "user_id" => self.user_id.clone(),
            "likes" => self.likes.map(|v| v.to_string()),
            _ => None,
        }
    }
}

/// Equality on one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowPredicate {
    pub column: String,
    pub value: String,
}

impl RowPredicate {
    pub fn eq(column: &str, value: &str) -> Self {
        Self {
            column: column.to_string(),
            value: value.to_string(),
        }
    }

    pub fn matches(&self, row: &RowImage) -> bool {
        row.column(&self.column).as_deref() == Some(self.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeFilter {
    pub table: String,
    pub event: EventFilter,
    pub predicate: RowPredicate,
}

impl ChangeFilter {
    pub fn new(table: &str, event: EventFilter, predicate: RowPredicate) -> Self {
        Self {
            table: table.to_string(),
            event,
            predicate,
        }
    }

    pub fn matches(&self, event: &ChangeEvent) -> bool {
        self.table == event.table
            && self.event.matches(event.kind)
            && self.predicate.matches(&event.row)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub table: String,
    pub kind: ChangeKind,
    pub row: RowImage,
}
