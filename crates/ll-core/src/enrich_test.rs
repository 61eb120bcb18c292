use super::*;
use std::cell::RefCell;

#[derive(Default)]
struct RecordingLookup {
    requested: RefCell<Vec<String>>,
}

impl ColumnLookup for RecordingLookup {
    fn lookup_columns(&self, table: &TableRef) -> Result<Vec<ColumnInfo>, LookupError> {
        self.requested.borrow_mut().push(table.key().to_string());
        match table.key() {
            "users" => Ok(vec![
                ColumnInfo::new("id", "integer").primary_key(),
                ColumnInfo::new("email", "text").not_null(),
            ]),
            "broken" => Err(LookupError::Catalog("connection reset".to_string())),
            other => Err(LookupError::TableNotFound(other.to_string())),
        }
    }
}

fn table(key: &str) -> TableRef {
    TableRef::new(key)
}

#[test]
fn test_no_catalog_returns_empty() {
    let columns = NoCatalog.lookup_columns(&table("users")).unwrap();
    assert!(columns.is_empty());
}

#[test]
fn test_enricher_caches_per_table() {
    let lookup = RecordingLookup::default();
    let mut enricher = TableEnricher::new(&lookup);

    let first = enricher.columns_for(&table("users"));
    let second = enricher.columns_for(&table("users"));

    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
    assert!(first[0].is_primary_key);
    assert_eq!(enricher.lookups_performed(), 1);
    assert_eq!(*lookup.requested.borrow(), vec!["users"]);
}

#[test]
fn test_enricher_failure_degrades_to_empty_and_is_not_retried() {
    let lookup = RecordingLookup::default();
    let mut enricher = TableEnricher::new(&lookup);

    assert!(enricher.columns_for(&table("broken")).is_empty());
    assert!(enricher.columns_for(&table("broken")).is_empty());
    assert!(enricher.columns_for(&table("missing")).is_empty());

    assert_eq!(enricher.lookups_performed(), 2);
}

#[test]
fn test_column_info_serializes_type_field() {
    let json = serde_json::to_string(&ColumnInfo::new("id", "integer").primary_key()).unwrap();
    assert_eq!(
        json,
        r#"{"name":"id","type":"integer","not_null":true,"is_primary_key":true}"#
    );
}
