//! Remote order store over HTTP
//!
//! Batch: `PUT {resource}/sort-order` with `[{ "id", "sort_order" }]`,
//! answered with `{ "updated": n }`.
//! Single item: `PUT {resource}/{id}/sort-order` with `{ "sort_order": n }`,
//! the id percent-encoded as one path segment.

use std::fmt;

use async_trait::async_trait;
use catalog_order::{
    Notifier, OptimisticOrderPersistence, OrderAssignment, PersistenceError, RemoteOrderStore,
};
use serde::de::DeserializeOwned;
use shared::models::{BatchUpdateResponse, SortOrderUpdate, sort_by_order};
use shared::Orderable;

use crate::{ClientError, ClientResult, HttpClient};

/// Reorderable lists exposed by the admin backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderResource {
    Products,
    Categories,
    FeaturedProducts,
    Sliders,
}

impl OrderResource {
    /// REST collection path
    pub fn path(&self) -> &'static str {
        match self {
            Self::Products => "api/products",
            Self::Categories => "api/categories",
            Self::FeaturedProducts => "api/featured-products",
            Self::Sliders => "api/sliders",
        }
    }
}

impl fmt::Display for OrderResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Products => write!(f, "product"),
            Self::Categories => write!(f, "category"),
            Self::FeaturedProducts => write!(f, "featured product"),
            Self::Sliders => write!(f, "slider"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpOrderStore {
    client: HttpClient,
    resource: OrderResource,
}

impl HttpOrderStore {
    pub fn new(client: HttpClient, resource: OrderResource) -> Self {
        Self { client, resource }
    }

    pub fn resource(&self) -> OrderResource {
        self.resource
    }

    /// Fetch the list in its durable order
    pub async fn load<T>(&self) -> ClientResult<Vec<T>>
    where
        T: DeserializeOwned + Orderable,
    {
        let mut items: Vec<T> = self.client.get(self.resource.path()).await?;
        sort_by_order(&mut items);
        tracing::debug!(resource = %self.resource, count = items.len(), "List loaded");
        Ok(items)
    }

    /// Load the list and wrap it for optimistic reordering
    pub async fn open<T, N>(self, notifier: N) -> ClientResult<OptimisticOrderPersistence<T, Self, N>>
    where
        T: DeserializeOwned + Orderable + Clone + Send + 'static,
        N: Notifier,
    {
        let items = self.load::<T>().await?;
        let label = self.resource.to_string();
        OptimisticOrderPersistence::keyed(items, self, notifier)
            .map(|list| list.with_label(label))
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl RemoteOrderStore for HttpOrderStore {
    async fn set_order(&self, assignments: &[OrderAssignment]) -> Result<(), PersistenceError> {
        let path = format!("{}/sort-order", self.resource.path());
        let response: BatchUpdateResponse = self.client.put(&path, assignments).await?;

        // The backend updates row by row; anything short of all rows is a failure
        if response.updated != assignments.len() {
            tracing::warn!(
                resource = %self.resource,
                updated = response.updated,
                total = assignments.len(),
                "Partial sort order update"
            );
            return Err(PersistenceError::new(format!(
                "Only {} of {} {} positions were saved",
                response.updated,
                assignments.len(),
                self.resource
            )));
        }
        Ok(())
    }

    async fn set_item_order(&self, id: &str, order: u32) -> Result<(), PersistenceError> {
        let url = self.client.endpoint(
            self.resource
                .path()
                .split('/')
                .chain([id, "sort-order"]),
        )?;
        self.client
            .put_ack(url, &SortOrderUpdate { sort_order: order })
            .await?;
        Ok(())
    }
}
