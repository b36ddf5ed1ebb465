//! Result table - the flattened event log handed to downstream consumers
//!
//! The table is the only output of a simulation. Rows keep the order
//! produced by [`Organization::collect_results`](crate::organization::Organization::collect_results):
//! population order, then chronological within each user.
//!
//! `to_record_batch` converts it to an Arrow batch with five non-null
//! `Utf8` columns, matching the row schema used by persistence layers:
//!
//! ```text
//! timestamp | user_id | type | name | outcome
//! ```

use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;

use crate::trial::{TrialRecord, TABLE_COLUMNS};
use crate::Result;

/// Ordered sequence of trial records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultTable {
    records: Vec<TrialRecord>,
}

impl ResultTable {
    /// Wrap records without reordering them.
    #[must_use]
    pub fn new(records: Vec<TrialRecord>) -> Self {
        Self { records }
    }

    /// Arrow schema of [`to_record_batch`](Self::to_record_batch).
    #[must_use]
    pub fn schema() -> SchemaRef {
        Arc::new(Schema::new(
            TABLE_COLUMNS
                .iter()
                .map(|name| Field::new(*name, DataType::Utf8, false))
                .collect::<Vec<_>>(),
        ))
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get all rows in order.
    #[must_use]
    pub fn records(&self) -> &[TrialRecord] {
        &self.records
    }

    /// Consume the table, returning its rows.
    #[must_use]
    pub fn into_records(self) -> Vec<TrialRecord> {
        self.records
    }

    /// Rows whose archetype tag equals `archetype`, order preserved.
    pub fn filter_archetype<'a>(
        &'a self,
        archetype: &'a str,
    ) -> impl Iterator<Item = &'a TrialRecord> {
        self.records.iter().filter(move |r| r.archetype() == archetype)
    }

    /// Convert to an Arrow record batch.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Arrow`](crate::Error::Arrow) if the batch cannot be assembled.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let column = |f: fn(&TrialRecord) -> String| -> ArrayRef {
            Arc::new(StringArray::from_iter_values(self.records.iter().map(f)))
        };

        let columns = vec![
            column(TrialRecord::timestamp_str),
            column(|r| r.user_id().to_string()),
            column(|r| r.archetype().to_string()),
            column(|r| r.display_name().to_string()),
            column(|r| r.outcome().to_string()),
        ];

        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }
}

impl From<Vec<TrialRecord>> for ResultTable {
    fn from(records: Vec<TrialRecord>) -> Self {
        Self::new(records)
    }
}

impl<'a> IntoIterator for &'a ResultTable {
    type Item = &'a TrialRecord;
    type IntoIter = std::slice::Iter<'a, TrialRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
