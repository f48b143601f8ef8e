//! MongoDB access for the reference collections and the submission log.
//!
//! Handlers talk to a `DocumentStore` trait object. Documents cross the trait
//! boundary as relaxed extended JSON, `_id` included; stripping it is the
//! caller's concern.

use anyhow::Result;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use serde_json::Value;
use tracing::{debug, info};

use crate::errors::AppError;

const DEFAULT_DATABASE: &str = "jobfitt";

/// The collections this service knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionName {
    EducationExperience,
    AlternateTitles,
    JobStateSalary,
    KnowledgeCluster,
    SalaryStateYear,
    Occupation,
    /// Write-only log of user submissions.
    UserData,
}

impl CollectionName {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionName::EducationExperience => "Education_Experience",
            CollectionName::AlternateTitles => "Alternate_Titles",
            CollectionName::JobStateSalary => "Job_State_Salary",
            CollectionName::KnowledgeCluster => "Knowledge_Cluster",
            CollectionName::SalaryStateYear => "Salary_State_Year",
            CollectionName::Occupation => "Occupation",
            CollectionName::UserData => "user_data",
        }
    }
}

impl std::fmt::Display for CollectionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Full scan of a collection.
    async fn find_all(&self, collection: CollectionName) -> Result<Vec<Value>, AppError>;

    /// All documents whose `field` equals `value` exactly.
    async fn find_by_field(
        &self,
        collection: CollectionName,
        field: &str,
        value: &str,
    ) -> Result<Vec<Value>, AppError>;

    /// First document whose `field` equals `value` exactly.
    async fn find_one_by_field(
        &self,
        collection: CollectionName,
        field: &str,
        value: &str,
    ) -> Result<Option<Value>, AppError>;

    /// Appends a document; must be a JSON object.
    async fn insert(&self, collection: CollectionName, document: Value) -> Result<(), AppError>;
}

/// Opens the MongoDB connection and verifies it with a ping.
pub async fn connect(uri: &str, database: Option<&str>) -> Result<mongodb::Database> {
    info!("Connecting to MongoDB...");

    let client = mongodb::Client::with_uri_str(uri).await?;
    let db = match database {
        Some(name) => client.database(name),
        None => client
            .default_database()
            .unwrap_or_else(|| client.database(DEFAULT_DATABASE)),
    };
    db.run_command(doc! { "ping": 1 }).await?;

    info!("MongoDB connection established (database: {})", db.name());
    Ok(db)
}

pub struct MongoDocumentStore {
    db: mongodb::Database,
}

impl MongoDocumentStore {
    pub fn new(db: mongodb::Database) -> Self {
        Self { db }
    }

    fn collection(&self, name: CollectionName) -> mongodb::Collection<Document> {
        self.db.collection(name.as_str())
    }

    async fn find_matching(
        &self,
        collection: CollectionName,
        filter: Document,
    ) -> Result<Vec<Value>, AppError> {
        let mut cursor = self.collection(collection).find(filter).await?;

        let mut documents = Vec::new();
        while let Some(document) = cursor.try_next().await? {
            documents.push(to_json(document));
        }

        debug!("Fetched {} documents from {collection}", documents.len());
        Ok(documents)
    }
}

#[async_trait]
impl DocumentStore for MongoDocumentStore {
    async fn find_all(&self, collection: CollectionName) -> Result<Vec<Value>, AppError> {
        info!("Retrieving data from Mongo {collection}");
        self.find_matching(collection, doc! {}).await
    }

    async fn find_by_field(
        &self,
        collection: CollectionName,
        field: &str,
        value: &str,
    ) -> Result<Vec<Value>, AppError> {
        self.find_matching(collection, field_filter(field, value)).await
    }

    async fn find_one_by_field(
        &self,
        collection: CollectionName,
        field: &str,
        value: &str,
    ) -> Result<Option<Value>, AppError> {
        let found = self
            .collection(collection)
            .find_one(field_filter(field, value))
            .await?;
        Ok(found.map(to_json))
    }

    async fn insert(&self, collection: CollectionName, document: Value) -> Result<(), AppError> {
        let document = mongodb::bson::to_document(&document)
            .map_err(|e| AppError::Database(format!("document is not insertable: {e}")))?;

        let inserted = self.collection(collection).insert_one(document).await?;
        info!("Inserted record ID {} into {collection}", inserted.inserted_id);
        Ok(())
    }
}

fn field_filter(field: &str, value: &str) -> Document {
    let mut filter = Document::new();
    filter.insert(field, value);
    filter
}

fn to_json(document: Document) -> Value {
    Bson::Document(document).into_relaxed_extjson()
}

/// In-memory store used by handler tests.
#[cfg(test)]
pub mod memory {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct MemoryDocumentStore {
        collections: Mutex<HashMap<CollectionName, Vec<Value>>>,
    }

    impl MemoryDocumentStore {
        pub fn with(self, collection: CollectionName, documents: Vec<Value>) -> Self {
            self.collections
                .lock()
                .unwrap()
                .entry(collection)
                .or_default()
                .extend(documents);
            self
        }

        pub fn documents(&self, collection: CollectionName) -> Vec<Value> {
            self.collections
                .lock()
                .unwrap()
                .get(&collection)
                .cloned()
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl DocumentStore for MemoryDocumentStore {
        async fn find_all(&self, collection: CollectionName) -> Result<Vec<Value>, AppError> {
            Ok(self.documents(collection))
        }

        async fn find_by_field(
            &self,
            collection: CollectionName,
            field: &str,
            value: &str,
        ) -> Result<Vec<Value>, AppError> {
            Ok(self
                .documents(collection)
                .into_iter()
                .filter(|d| d.get(field).and_then(Value::as_str) == Some(value))
                .collect())
        }

        async fn find_one_by_field(
            &self,
            collection: CollectionName,
            field: &str,
            value: &str,
        ) -> Result<Option<Value>, AppError> {
            Ok(self
                .find_by_field(collection, field, value)
                .await?
                .into_iter()
                .next())
        }

        async fn insert(
            &self,
            collection: CollectionName,
            document: Value,
        ) -> Result<(), AppError> {
            if !document.is_object() {
                return Err(AppError::Database("document must be an object".into()));
            }
            self.collections
                .lock()
                .unwrap()
                .entry(collection)
                .or_default()
                .push(document);
            Ok(())
        }
    }
}
