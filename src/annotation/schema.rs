//! Database schema definitions

/// SQL to create the annotations table
///
/// `value` holds the JSON encoding of the stored list of strings.
pub const CREATE_ANNOTATIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS annotations (
    owner INTEGER NOT NULL,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    PRIMARY KEY(owner, key)
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_annotations_key ON annotations(key)",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![CREATE_ANNOTATIONS_TABLE];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
