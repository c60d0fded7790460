//! Cliente Persistence Service

use async_trait::async_trait;
use futures::{stream::BoxStream, StreamExt};
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::{Collection, Database};

use super::entity::Cliente;
use crate::shared::error::{ApiError, Result};

pub const DEFAULT_COLLECTION: &str = "clientes";

/// Lazily produced sequence of clientes
pub type ClienteStream = BoxStream<'static, Result<Cliente>>;

/// Storage operations the resource handlers depend on
#[async_trait]
pub trait ClienteService: Send + Sync {
    /// All clientes, in whatever order the store yields them
    async fn find_all(&self) -> Result<ClienteStream>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Cliente>>;

    /// Insert or replace. A cliente without id gets one assigned.
    async fn save(&self, cliente: Cliente) -> Result<Cliente>;

    async fn delete(&self, cliente: &Cliente) -> Result<()>;
}

/// `_id` filter for a wire identifier.
///
/// Hex ids match the ObjectId key and its string form; anything else can
/// only match a string key.
pub(crate) fn id_filter(id: &str) -> Document {
    match ObjectId::parse_str(id) {
        Ok(oid) => doc! { "_id": { "$in": [oid, id] } },
        Err(_) => doc! { "_id": id },
    }
}

/// MongoDB-backed persistence service
pub struct MongoClienteService {
    collection: Collection<Cliente>,
    batch_size: u32,
}

impl MongoClienteService {
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, DEFAULT_COLLECTION)
    }

    pub fn with_collection(db: &Database, name: &str) -> Self {
        Self {
            collection: db.collection(name),
            batch_size: 100,
        }
    }

    /// Cursor batch size for `find_all`
    pub fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = batch_size;
        self
    }
}

#[async_trait]
impl ClienteService for MongoClienteService {
    async fn find_all(&self) -> Result<ClienteStream> {
        let cursor = self.collection
            .find(doc! {})
            .batch_size(self.batch_size)
            .await?;
        Ok(cursor.map(|item| item.map_err(ApiError::from)).boxed())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Cliente>> {
        Ok(self.collection.find_one(id_filter(id)).await?)
    }

    async fn save(&self, mut cliente: Cliente) -> Result<Cliente> {
        if cliente.ensure_id() {
            self.collection.insert_one(&cliente).await?;
        } else if let Some(id) = cliente.id.as_deref() {
            self.collection
                .replace_one(id_filter(id), &cliente)
                .upsert(true)
                .await?;
        }
        Ok(cliente)
    }

    async fn delete(&self, cliente: &Cliente) -> Result<()> {
        let Some(id) = cliente.id.as_deref() else {
            return Ok(());
        };
        let result = self.collection.delete_one(id_filter(id)).await?;
        tracing::debug!(cliente_id = %id, deleted = result.deleted_count, "Deleted cliente document");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::Bson;

    #[test]
    fn test_hex_id_filter_matches_object_id_and_string() {
        let oid = ObjectId::new();
        let filter = id_filter(&oid.to_hex());

        let candidates = filter.get_document("_id").unwrap().get_array("$in").unwrap();
        assert_eq!(candidates, &vec![Bson::ObjectId(oid), Bson::String(oid.to_hex())]);
    }

    #[test]
    fn test_non_hex_id_filter_is_plain_string() {
        assert_eq!(id_filter("legacy-42"), doc! { "_id": "legacy-42" });
        assert_eq!(id_filter(""), doc! { "_id": "" });
    }

    #[test]
    fn test_generated_id_encodes_like_filter_key() {
        // The key written on insert is the ObjectId the filter looks for
        let mut cliente = Cliente::new("Ana", "Diaz", 30, 1.0);
        assert!(cliente.ensure_id());
        let id = cliente.id.clone().unwrap();

        let stored = bson::to_document(&cliente).unwrap();
        let filter = id_filter(&id);
        let candidates = filter.get_document("_id").unwrap().get_array("$in").unwrap();
        assert_eq!(stored.get("_id"), candidates.first());
    }

    #[test]
    fn test_stored_decode_failure_is_internal_error() {
        let decode = bson::from_document::<Cliente>(doc! { "_id": ObjectId::new(), "nombre": 5 }).unwrap_err();
        let err = ApiError::from(mongodb::error::Error::from(decode));
        assert_eq!(err.kind(), crate::shared::error::ErrorKind::Internal);
    }

    /// Round trip against a live deployment:
    /// `CLIENTES_MONGODB_URI=mongodb://localhost:27017 cargo test -- --ignored`
    #[tokio::test]
    #[ignore = "needs a MongoDB deployment at CLIENTES_MONGODB_URI"]
    async fn test_round_trip_against_mongodb() {
        use futures::TryStreamExt;

        let uri = std::env::var("CLIENTES_MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let client = mongodb::Client::with_uri_str(&uri).await.unwrap();
        let db = client.database("clientes_test");
        let name = format!("clientes_{}", ObjectId::new().to_hex());
        let service = MongoClienteService::with_collection(&db, &name).with_batch_size(1);
        let raw: Collection<Document> = db.collection(&name);

        // Document written the way an ObjectId-keyed store writes it
        let legacy = ObjectId::new();
        raw.insert_one(doc! { "_id": legacy, "nombre": "Ana", "apellido": "Diaz", "edad": 30, "sueldo": 1500.5 })
            .await
            .unwrap();

        let found = service.find_by_id(&legacy.to_hex()).await.unwrap().unwrap();
        assert_eq!(found.nombre, "Ana");

        // Insert assigns an ObjectId key
        let saved = service.save(Cliente::new("Luis", "Paz", 40, 900.0)).await.unwrap();
        let stored = raw.find_one(doc! { "nombre": "Luis" }).await.unwrap().unwrap();
        assert_eq!(stored.get_object_id("_id").unwrap().to_hex(), saved.id.clone().unwrap());

        // Replace keeps the key
        let mut changed = found.clone();
        changed.edad = 31;
        service.save(changed).await.unwrap();
        assert_eq!(raw.count_documents(doc! {}).await.unwrap(), 2);
        assert_eq!(service.find_by_id(&legacy.to_hex()).await.unwrap().unwrap().edad, 31);

        let all: Vec<Cliente> = service.find_all().await.unwrap().try_collect().await.unwrap();
        assert_eq!(all.len(), 2);

        service.delete(&found).await.unwrap();
        service.delete(&Cliente::new("x", "y", 1, 1.0)).await.unwrap();
        assert!(service.find_by_id(&legacy.to_hex()).await.unwrap().is_none());
        assert!(service.find_by_id("not-hex").await.unwrap().is_none());

        raw.drop().await.unwrap();
    }
}
