use crate::{Entry, EntryDocument, NewEntry, Position, place, tests::fakes::document};

use chrono::{TimeZone, Utc};
use serde_json::json;

/// WHAT: A complete document maps field by field
/// WHY: Stored coordinates and timestamps must be honoured as written
#[test]
fn given_complete_document_when_mapping_then_all_fields_used() {
    // Given: A document with locator, timestamp and coordinates
    let doc = document("e1", "entries/u1/1-a.webm");

    // When: Mapping it
    let entry = Entry::from_document(&doc);

    // Then: Every field comes from the document
    let expected_created = Utc.with_ymd_and_hms(2024, 3, 1, 21, 15, 0).single();
    assert_eq!(
        entry,
        Some(Entry {
            id: "e1".to_string(),
            locator: "entries/u1/1-a.webm".to_string(),
            created_at: expected_created,
            position: Position { x: 42.0, y: 55.5 },
        })
    );
}

/// WHAT: Documents without a usable locator are dropped
/// WHY: A star that can't be played must not be rendered
#[test]
fn given_bad_locator_when_mapping_then_document_skipped() {
    // Given: Missing, empty and non-string locators
    let docs = [
        json!({ "x": 10.0, "y": 20.0 }),
        json!({ "storagePath": "" }),
        json!({ "storagePath": 17 }),
        json!("not an object"),
    ];

    for data in docs {
        // When: Mapping each
        let doc = EntryDocument {
            id: "bad".to_string(),
            data,
        };

        // Then: Nothing comes out
        assert_eq!(Entry::from_document(&doc), None);
    }
}

/// WHAT: Missing or non-numeric coordinates fall back to placement
/// WHY: Older documents without coordinates still need a stable spot
#[test]
fn given_partial_coordinates_when_mapping_then_position_derived_from_id() {
    // Given: One document without y, one with a string x
    let without_y = EntryDocument {
        id: "abc".to_string(),
        data: json!({ "storagePath": "p", "x": 12.5 }),
    };
    let string_x = EntryDocument {
        id: "abc".to_string(),
        data: json!({ "storagePath": "p", "x": "12", "y": 40 }),
    };

    // When / Then: Both use the id-derived position
    for doc in [without_y, string_x] {
        let entry = Entry::from_document(&doc);
        assert_eq!(entry.map(|e| e.position), Some(place("abc")));
    }
}

/// WHAT: Unset creation time is tolerated and labelled generically
/// WHY: Server timestamps are absent in the first local snapshot
#[test]
fn given_missing_timestamp_when_mapping_then_generic_label() {
    // Given: A document whose createdAt hasn't been written yet
    let doc = EntryDocument {
        id: "fresh".to_string(),
        data: json!({ "storagePath": "p", "createdAt": null }),
    };

    // When: Mapping it
    let entry = Entry::from_document(&doc);

    // Then: No timestamp, generic label
    assert_eq!(entry.as_ref().and_then(|e| e.created_at), None);
    assert_eq!(
        entry.map(|e| e.label()).as_deref(),
        Some("New voice diary")
    );
}

/// WHAT: Dated entries get a dated label
/// WHY: The label is the star's accessible name
#[test]
fn given_timestamp_when_labelling_then_date_included() {
    // Given: A stored entry
    let entry = Entry::from_document(&document("e1", "p"));

    // When / Then: The label carries the calendar date
    assert_eq!(
        entry.map(|e| e.label()).as_deref(),
        Some("Voice diary from 2024-03-01")
    );
}

/// WHAT: A new entry's fields map back to the same entry
/// WHY: What the recorder writes must be what the feed reads
#[test]
fn given_new_entry_when_written_and_read_back_then_fields_preserved() {
    // Given: A new entry and a commit time
    let new_entry = NewEntry {
        storage_path: "entries/u1/5-x.wav".to_string(),
        position: Position { x: 33.33, y: 66.66 },
    };
    let created_at = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).single();

    // When: Writing then reading
    let doc = EntryDocument {
        id: "new".to_string(),
        data: new_entry.to_document_data(created_at.unwrap_or_default()),
    };
    let entry = Entry::from_document(&doc);

    // Then: Locator, position and time survive
    assert_eq!(
        entry,
        Some(Entry {
            id: "new".to_string(),
            locator: "entries/u1/5-x.wav".to_string(),
            created_at,
            position: Position { x: 33.33, y: 66.66 },
        })
    );
}
