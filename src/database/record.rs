//! Entity families stored in the document tables.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::types::boost::Boost;
use crate::types::collection::Collection;
use crate::types::note::BrowserNote;
use crate::types::reading_list::ReadingListItem;

/// One document table per entity family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFamily {
    Boosts,
    Collections,
    Notes,
    ReadingList,
}

impl RecordFamily {
    pub const ALL: [RecordFamily; 4] = [
        RecordFamily::Boosts,
        RecordFamily::Collections,
        RecordFamily::Notes,
        RecordFamily::ReadingList,
    ];

    pub fn table(self) -> &'static str {
        match self {
            RecordFamily::Boosts => "boosts",
            RecordFamily::Collections => "collections",
            RecordFamily::Notes => "notes",
            RecordFamily::ReadingList => "reading_list",
        }
    }

    /// Secondary index columns, generated from the JSON document.
    pub fn indexed_columns(self) -> &'static [&'static str] {
        match self {
            RecordFamily::Boosts => &["enabled"],
            RecordFamily::Collections => &[],
            RecordFamily::Notes => &["url", "collection_id"],
            RecordFamily::ReadingList => &["url", "is_read"],
        }
    }

    pub fn has_index(self, column: &str) -> bool {
        self.indexed_columns().contains(&column)
    }
}

/// A record that can be written to and read from its family's table.
pub trait StoredRecord: Serialize + DeserializeOwned {
    const FAMILY: RecordFamily;

    fn record_id(&self) -> &str;
}

impl StoredRecord for Boost {
    const FAMILY: RecordFamily = RecordFamily::Boosts;

    fn record_id(&self) -> &str {
        &self.id
    }
}

impl StoredRecord for Collection {
    const FAMILY: RecordFamily = RecordFamily::Collections;

    fn record_id(&self) -> &str {
        &self.id
    }
}

impl StoredRecord for BrowserNote {
    const FAMILY: RecordFamily = RecordFamily::Notes;

    fn record_id(&self) -> &str {
        &self.id
    }
}

impl StoredRecord for ReadingListItem {
    const FAMILY: RecordFamily = RecordFamily::ReadingList;

    fn record_id(&self) -> &str {
        &self.id
    }
}
