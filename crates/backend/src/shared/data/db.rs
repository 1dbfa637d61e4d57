use std::path::Path;

use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};

/// SQLite-backed document store
///
/// The store traits are implemented next to each aggregate's entity, in
/// `domain::aNNN::repository`.
#[derive(Clone)]
pub struct SqliteStore {
    conn: DatabaseConnection,
}

impl SqliteStore {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Open (or create) the database file and bootstrap its schema
    pub async fn open(db_file: &Path) -> anyhow::Result<Self> {
        let conn = connect(db_file).await?;
        bootstrap_schema(&conn).await?;
        Ok(Self::new(conn))
    }

    pub fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }
}

/// Connect to a SQLite file, creating it and its parent directory if needed
pub async fn connect(db_file: &Path) -> anyhow::Result<DatabaseConnection> {
    if let Some(parent) = db_file.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let absolute_path = if db_file.is_absolute() {
        db_file.to_path_buf()
    } else {
        std::env::current_dir()?.join(db_file)
    };
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    let db_url = format!("sqlite://{}{}?mode=rwc", prefix, normalized);
    tracing::info!("Connecting to database {}", db_url);
    Ok(Database::connect(&db_url).await?)
}

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS a001_project (
        id TEXT PRIMARY KEY NOT NULL,
        name TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        owner_id TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS a002_project_member (
        id TEXT PRIMARY KEY NOT NULL,
        project_id TEXT NOT NULL,
        user_id TEXT NOT NULL,
        user_name TEXT NOT NULL DEFAULT '',
        user_email TEXT NOT NULL DEFAULT '',
        role TEXT NOT NULL,
        added_at TEXT NOT NULL
    );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_a002_project ON a002_project_member (project_id);",
    "CREATE INDEX IF NOT EXISTS idx_a002_user ON a002_project_member (user_id);",
    r#"
    CREATE TABLE IF NOT EXISTS a003_collection (
        id TEXT PRIMARY KEY NOT NULL,
        project_id TEXT NOT NULL,
        name TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_a003_project ON a003_collection (project_id);",
    r#"
    CREATE TABLE IF NOT EXISTS a004_field_definition (
        id TEXT PRIMARY KEY NOT NULL,
        collection_id TEXT NOT NULL,
        name TEXT NOT NULL,
        field_type TEXT NOT NULL,
        config TEXT NOT NULL DEFAULT '{}',
        sort_order INTEGER NOT NULL DEFAULT 0,
        required INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_a004_collection ON a004_field_definition (collection_id);",
    r#"
    CREATE TABLE IF NOT EXISTS a005_data_record (
        id TEXT PRIMARY KEY NOT NULL,
        collection_id TEXT NOT NULL,
        project_id TEXT NOT NULL,
        data TEXT NOT NULL DEFAULT '{}',
        created_by TEXT NOT NULL DEFAULT '',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_a005_collection ON a005_data_record (collection_id);",
];

/// Create missing tables and indexes
pub async fn bootstrap_schema(conn: &DatabaseConnection) -> anyhow::Result<()> {
    for sql in SCHEMA {
        conn.execute(Statement::from_string(DatabaseBackend::Sqlite, sql.to_string()))
            .await?;
    }
    tracing::info!("Database schema ready ({} statements)", SCHEMA.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::store::{
        CollectionStore, FieldDefinitionStore, ProjectStore, RecordStore, StoreError,
    };
    use contracts::domain::a001_project::aggregate::Project;
    use contracts::domain::a003_collection::aggregate::Collection;
    use contracts::domain::a004_field_definition::aggregate::FieldDefinition;
    use contracts::domain::a005_data_record::aggregate::{DataRecord, RecordData};
    use contracts::shared::metadata::{FieldConfig, FieldValue, NumberConfig};

    #[tokio::test]
    async fn test_sqlite_roundtrip() {
        let path = std::env::temp_dir().join(format!("records-{}.db", uuid::Uuid::new_v4()));
        let store = SqliteStore::open(&path).await.unwrap();

        let project = store
            .create_project(&Project::new_for_insert("P".into(), String::new(), "u1".into()))
            .await
            .unwrap();
        let collection = store
            .create_collection(&Collection::new_for_insert(project.id, "C".into(), String::new()))
            .await
            .unwrap();

        let mut price = FieldDefinition::new_for_insert(
            collection.id,
            "price".into(),
            FieldConfig::Number(NumberConfig::default()),
            true,
        );
        price.order = 1;
        let total = FieldDefinition::new_for_insert(
            collection.id,
            "total".into(),
            FieldConfig::Number(NumberConfig::formula("price * 2")),
            false,
        );
        let price = store.create_field(&price).await.unwrap();
        let total = store.create_field(&total).await.unwrap();
        assert!(total.metadata.created_at >= price.metadata.created_at);

        let fields = store.list_fields_by_collection(collection.id).await.unwrap();
        assert_eq!(fields, vec![total.clone(), price.clone()]);

        let mut renamed = price.clone();
        renamed.name = "unit price".into();
        let renamed = store.update_field(&renamed).await.unwrap();
        assert_eq!(renamed.metadata.created_at, price.metadata.created_at);
        assert!(renamed.metadata.updated_at >= price.metadata.updated_at);

        let mut data = RecordData::new();
        data.insert(price.id.key(), FieldValue::Number(4.5));
        let mut record = store
            .create_record(&DataRecord::new_for_insert(collection.id, project.id, data, "u1".into()))
            .await
            .unwrap();
        assert_eq!(store.count_records_by_collection(collection.id).await.unwrap(), 1);

        record.data.insert(price.id.key(), FieldValue::empty());
        let updated = store.update_record(&record).await.unwrap();
        assert_eq!(updated.metadata.created_at, record.metadata.created_at);
        let fetched = store.get_record(record.id).await.unwrap().unwrap();
        assert_eq!(fetched.data, record.data);

        assert!(store.delete_record(record.id).await.unwrap());
        assert!(matches!(
            store.update_record(&record).await,
            Err(StoreError::Missing { .. })
        ));

        drop(store);
        let _ = std::fs::remove_file(&path);
    }
}
