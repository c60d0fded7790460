//! In-memory persistence service
//!
//! Keeps clientes in insertion order. Used by the `memory` storage backend
//! and by the handler tests.

use async_trait::async_trait;
use futures::{stream, StreamExt};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::sync::Arc;

use super::entity::Cliente;
use super::repository::{ClienteService, ClienteStream};
use crate::shared::error::Result;

#[derive(Clone, Default)]
pub struct InMemoryClienteService {
    clientes: Arc<RwLock<IndexMap<String, Cliente>>>,
}

impl InMemoryClienteService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.clientes.read().is_empty()
    }
}

#[async_trait]
impl ClienteService for InMemoryClienteService {
    async fn find_all(&self) -> Result<ClienteStream> {
        // Snapshot so the lock is not held while the body streams
        let snapshot: Vec<Result<Cliente>> = self.clientes.read().values().cloned().map(Ok).collect();
        Ok(stream::iter(snapshot).boxed())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Cliente>> {
        Ok(self.clientes.read().get(id).cloned())
    }

    async fn save(&self, mut cliente: Cliente) -> Result<Cliente> {
        cliente.ensure_id();
        if let Some(id) = cliente.id.clone() {
            // Replacing an existing key keeps its position
            self.clientes.write().insert(id, cliente.clone());
        }
        Ok(cliente)
    }

    async fn delete(&self, cliente: &Cliente) -> Result<()> {
        if let Some(id) = cliente.id.as_deref() {
            self.clientes.write().shift_remove(id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;

    #[tokio::test]
    async fn test_save_assigns_id() {
        let store = InMemoryClienteService::new();
        let saved = store.save(Cliente::new("Ana", "Diaz", 30, 1500.5)).await.unwrap();

        let id = saved.id.clone().unwrap();
        assert!(!id.is_empty());
        assert_eq!(store.find_by_id(&id).await.unwrap(), Some(saved));
    }

    #[tokio::test]
    async fn test_save_existing_replaces_in_place() {
        let store = InMemoryClienteService::new();
        let first = store.save(Cliente::new("Ana", "Diaz", 30, 1.0)).await.unwrap();
        store.save(Cliente::new("Luis", "Paz", 40, 2.0)).await.unwrap();

        let mut changed = first.clone();
        changed.edad = 31;
        store.save(changed).await.unwrap();

        let all: Vec<Cliente> = store.find_all().await.unwrap().try_collect().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, first.id);
        assert_eq!(all[0].edad, 31);
    }

    #[tokio::test]
    async fn test_delete_removes() {
        let store = InMemoryClienteService::new();
        let saved = store.save(Cliente::new("Ana", "Diaz", 30, 1.0)).await.unwrap();

        store.delete(&saved).await.unwrap();
        assert!(store.is_empty());
        assert!(store.find_by_id(saved.id.as_deref().unwrap()).await.unwrap().is_none());

        // Unsaved or already removed clientes are a no-op
        store.delete(&saved).await.unwrap();
        store.delete(&Cliente::new("x", "y", 1, 1.0)).await.unwrap();
    }
}
