//! Diary record persistence and facet aggregate maintenance.

use crate::error::Result;
use crate::facets::FilterData;
use crate::remote::{from_document, paths, to_document, DocumentStore, Query};
use crate::types::DiaryRecord;

/// Write (create or replace) one diary record.
pub async fn save_record<S: DocumentStore>(remote: &S, uid: &str, record: &DiaryRecord) -> Result<()> {
    let path = paths::diary_record(uid, &record.id);
    remote.set(&path, to_document(record)?).await
}

/// Read every diary record of a user, ordered by id.
pub async fn list_records<S: DocumentStore>(remote: &S, uid: &str) -> Result<Vec<DiaryRecord>> {
    let documents = remote.query(&Query::collection(paths::diary(uid))).await?;
    documents
        .into_iter()
        .map(from_document::<DiaryRecord>)
        .collect()
}

/// Recompute the facet aggregate from the diary collection and store it.
pub async fn rebuild_filter_data<S: DocumentStore>(remote: &S, uid: &str) -> Result<FilterData> {
    let records = list_records(remote, uid).await?;
    let data = FilterData::from_records(&records);
    remote
        .set(&paths::filter_data(uid), to_document(&data)?)
        .await?;
    tracing::debug!(uid, records = records.len(), "rebuilt facet aggregate");
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::remote::SqliteDocumentStore;
    use crate::types::MediaType;

    #[tokio::test]
    async fn test_saved_records_feed_the_aggregate() {
        let store = SqliteDocumentStore::open_in_memory().expect("open");
        let day = NaiveDate::from_ymd_opt(2023, 3, 4).expect("valid date");
        save_record(&store, "u1", &DiaryRecord::new("b", MediaType::Tv, "B", day))
            .await
            .expect("save");
        save_record(&store, "u1", &DiaryRecord::new("a", MediaType::Film, "A", day))
            .await
            .expect("save");

        let records = list_records(&store, "u1").await.expect("list");
        assert_eq!(records.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(), vec!["a", "b"]);

        let data = rebuild_filter_data(&store, "u1").await.expect("rebuild");
        assert_eq!(data.filter_diary_year.get(&2023), Some(&2));
        let stored = store
            .get(&paths::filter_data("u1"))
            .await
            .expect("get")
            .expect("aggregate stored");
        assert_eq!(from_document::<FilterData>(stored).expect("decode"), data);
    }

    #[tokio::test]
    async fn test_saving_same_id_replaces_record() {
        let store = SqliteDocumentStore::open_in_memory().expect("open");
        let day = NaiveDate::from_ymd_opt(2023, 3, 4).expect("valid date");
        let record = DiaryRecord::new("a", MediaType::Film, "A", day);
        save_record(&store, "u1", &record).await.expect("save");
        save_record(&store, "u1", &record.clone().with_genre("Drama"))
            .await
            .expect("save");
        let records = list_records(&store, "u1").await.expect("list");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].genre.as_deref(), Some("Drama"));
    }
}
