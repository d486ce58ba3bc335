use pq_core::traits::SchemaInspector;
use pq_core::*;
use tempfile::tempdir;

mod test_helpers;
use test_helpers::*;

#[test]
fn test_describe_people_file() {
    let dir = tempdir().unwrap();
    let path = write_people(&dir.path().join("people.parquet"), 12, 10);
    let file = ParquetFile::open(&path).unwrap();

    let text = describe(file.schema().unwrap(), file.count().unwrap());
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "File contains 12 rows of data");
    assert_eq!(lines[1], "Schema elements (fields):");
    assert_eq!(lines[2], "  UserID: INT64, required");
    assert!(lines[3].starts_with("  displayName: BYTE_ARRAY, logical=String"));
    assert!(lines[3].ends_with(", optional"));
    assert_eq!(lines[4], "  address: group, optional");
    assert!(lines[5].starts_with("    City: BYTE_ARRAY"));
    assert_eq!(lines[6], "    zip: INT32, optional");
    assert!(lines[7].starts_with("  tags: group, logical=List"));
}

#[test]
fn test_inspect_people_schema() {
    let dir = tempdir().unwrap();
    let path = write_people(&dir.path().join("people.parquet"), 1, 10);
    let file = ParquetFile::open(&path).unwrap();
    let schema = file.schema().unwrap();

    assert!(schema.has_field("address.City"));
    assert!(!schema.has_field("address.city"));
    assert!(schema.has_field("tags"));

    let zip = schema.get_field_by_path("address.zip").unwrap();
    assert_eq!(zip.physical_type, Some(parquet::basic::Type::INT32));

    let paths = schema.all_field_paths();
    assert_eq!(&paths[..4], &["UserID", "displayName", "address", "address.City"]);
}
