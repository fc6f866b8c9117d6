use std::sync::Arc;

use futures::future::try_join;
use thiserror::Error;

use crate::domain::node::{Node, NodeKind};
use crate::stores::{CatalogStore, StoreError};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("no {kind} found for slug `{slug}`")]
    NotFound { kind: NodeKind, slug: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Slug resolution and descendant listing over the catalog store.
#[derive(Clone)]
pub struct HierarchyResolver {
    catalog: Arc<dyn CatalogStore>,
}

impl HierarchyResolver {
    pub fn new(catalog: Arc<dyn CatalogStore>) -> Self {
        Self { catalog }
    }

    pub async fn resolve(&self, kind: NodeKind, slug: &str) -> Result<Node, ResolveError> {
        self.catalog
            .find_by_slug(kind, slug)
            .await?
            .ok_or_else(|| ResolveError::NotFound { kind, slug: slug.to_owned() })
    }

    /// All cascade targets below `node`: for an organization its
    /// departments followed by all of its products (fetched concurrently),
    /// for a department its products. Products have no children.
    pub async fn children(&self, node: &Node) -> Result<Vec<Node>, ResolveError> {
        match node.kind {
            NodeKind::Organization => {
                let (mut departments, products) = try_join(
                    self.catalog.find_children(NodeKind::Department, node),
                    self.catalog.find_children(NodeKind::Product, node),
                )
                .await?;
                departments.extend(products);
                Ok(departments)
            }
            NodeKind::Department => {
                Ok(self.catalog.find_children(NodeKind::Product, node).await?)
            }
            NodeKind::Product => Ok(Vec::new()),
        }
    }
}
