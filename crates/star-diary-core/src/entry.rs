use crate::placement::{Position, place};

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

pub(crate) const STORAGE_PATH_FIELD: &str = "storagePath";
pub(crate) const CREATED_AT_FIELD: &str = "createdAt";
pub(crate) const X_FIELD: &str = "x";
pub(crate) const Y_FIELD: &str = "y";

/// Raw document as delivered by the document store.
///
/// Field values are untyped; [`Entry::from_document`] decides what is usable.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryDocument {
    /// Store-assigned document id.
    pub id: String,
    /// Document fields.
    pub data: Value,
}

/// Fields written when appending a new entry.
///
/// The creation timestamp is left to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    /// Locator of the uploaded audio object.
    pub storage_path: String,
    /// Star position.
    pub position: Position,
}

impl NewEntry {
    /// Document fields for this entry, stamped with the store's clock.
    pub fn to_document_data(&self, created_at: DateTime<Utc>) -> Value {
        let mut fields = Map::new();
        fields.insert(
            STORAGE_PATH_FIELD.to_string(),
            Value::from(self.storage_path.as_str()),
        );
        fields.insert(
            CREATED_AT_FIELD.to_string(),
            Value::from(created_at.to_rfc3339()),
        );
        fields.insert(X_FIELD.to_string(), Value::from(self.position.x));
        fields.insert(Y_FIELD.to_string(), Value::from(self.position.y));
        Value::Object(fields)
    }
}

/// One recorded diary note, ready to be drawn as a star.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// Store-assigned id, unique within the user's entries.
    pub id: String,
    /// Reference to the stored audio object.
    pub locator: String,
    /// Commit time, unset until the store has written it.
    pub created_at: Option<DateTime<Utc>>,
    /// Where the star sits on the canvas.
    pub position: Position,
}

impl Entry {
    /// Build an entry from a store document.
    ///
    /// Returns `None` when the locator is missing, empty or not a string.
    /// Stored coordinates win when both are numeric; otherwise the position
    /// is derived from the id.
    pub fn from_document(document: &EntryDocument) -> Option<Self> {
        let fields = document.data.as_object()?;

        let locator = fields
            .get(STORAGE_PATH_FIELD)
            .and_then(Value::as_str)
            .filter(|path| !path.is_empty())?;

        Some(Self {
            id: document.id.clone(),
            locator: locator.to_string(),
            created_at: parse_created_at(fields),
            position: stored_position(fields).unwrap_or_else(|| place(&document.id)),
        })
    }

    /// Accessible label for the star.
    pub fn label(&self) -> String {
        match self.created_at {
            Some(created_at) => format!("Voice diary from {}", created_at.format("%Y-%m-%d")),
            None => "New voice diary".to_string(),
        }
    }
}

fn parse_created_at(fields: &Map<String, Value>) -> Option<DateTime<Utc>> {
    let raw = fields.get(CREATED_AT_FIELD)?.as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|timestamp| timestamp.with_timezone(&Utc))
}

fn stored_position(fields: &Map<String, Value>) -> Option<Position> {
    let x = fields.get(X_FIELD)?.as_f64()?;
    let y = fields.get(Y_FIELD)?.as_f64()?;
    Some(Position { x, y })
}
