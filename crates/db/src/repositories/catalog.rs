use okrbot_core::domain::node::{Node, NodeId, NodeKind};
use okrbot_core::stores::{CatalogStore, StoreError};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::backend;
use crate::DbPool;

/// Read-only catalog lookups over the organizations/departments/products
/// tables. Slugs are unique per table, so slug resolution is a plain
/// `fetch_optional`.
pub struct SqlCatalogStore {
    pool: DbPool,
}

impl SqlCatalogStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn organization_from_row(row: &SqliteRow) -> Node {
    Node::organization(
        row.get::<String, _>("id"),
        row.get::<String, _>("slug"),
        row.get::<String, _>("name"),
    )
}

fn department_from_row(row: &SqliteRow) -> Node {
    Node::department(
        row.get::<String, _>("id"),
        row.get::<String, _>("slug"),
        row.get::<String, _>("name"),
        NodeId(row.get::<String, _>("organization_id")),
    )
}

fn product_from_row(row: &SqliteRow) -> Node {
    Node::product(
        row.get::<String, _>("id"),
        row.get::<String, _>("slug"),
        row.get::<String, _>("name"),
        NodeId(row.get::<String, _>("organization_id")),
        NodeId(row.get::<String, _>("department_id")),
    )
}

#[async_trait::async_trait]
impl CatalogStore for SqlCatalogStore {
    async fn find_by_slug(&self, kind: NodeKind, slug: &str) -> Result<Option<Node>, StoreError> {
        let row = match kind {
            NodeKind::Organization => {
                sqlx::query("SELECT id, slug, name FROM organizations WHERE slug = ?1")
                    .bind(slug)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(backend)?
                    .map(|row| organization_from_row(&row))
            }
            NodeKind::Department => sqlx::query(
                "SELECT id, slug, name, organization_id FROM departments WHERE slug = ?1",
            )
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?
            .map(|row| department_from_row(&row)),
            NodeKind::Product => sqlx::query(
                "SELECT id, slug, name, organization_id, department_id FROM products WHERE slug = ?1",
            )
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?
            .map(|row| product_from_row(&row)),
        };
        Ok(row)
    }

    async fn find_children(
        &self,
        child_kind: NodeKind,
        parent: &Node,
    ) -> Result<Vec<Node>, StoreError> {
        let rows = match (parent.kind, child_kind) {
            (NodeKind::Organization, NodeKind::Department) => sqlx::query(
                "SELECT id, slug, name, organization_id FROM departments
                 WHERE organization_id = ?1 ORDER BY slug",
            )
            .bind(&parent.id.0)
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?
            .iter()
            .map(department_from_row)
            .collect(),
            (NodeKind::Organization, NodeKind::Product) => sqlx::query(
                "SELECT id, slug, name, organization_id, department_id FROM products
                 WHERE organization_id = ?1 ORDER BY slug",
            )
            .bind(&parent.id.0)
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?
            .iter()
            .map(product_from_row)
            .collect(),
            (NodeKind::Department, NodeKind::Product) => sqlx::query(
                "SELECT id, slug, name, organization_id, department_id FROM products
                 WHERE department_id = ?1 ORDER BY slug",
            )
            .bind(&parent.id.0)
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?
            .iter()
            .map(product_from_row)
            .collect(),
            _ => Vec::new(),
        };
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use okrbot_core::domain::node::NodeKind;
    use okrbot_core::stores::CatalogStore;

    use crate::fixtures::{oslo_demo_dataset, seed_catalog};
    use crate::repositories::SqlCatalogStore;
    use crate::{connect_with_settings, migrations};

    async fn seeded_store() -> SqlCatalogStore {
        let pool = connect_with_settings("sqlite::memory:", 1, 5).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrate");
        seed_catalog(&pool, &oslo_demo_dataset()).await.expect("seed");
        SqlCatalogStore::new(pool)
    }

    #[tokio::test]
    async fn finds_nodes_by_slug_within_their_kind() {
        let store = seeded_store().await;

        let organization = store
            .find_by_slug(NodeKind::Organization, "oslo-origo")
            .await
            .expect("query")
            .expect("organization");
        assert_eq!(organization.name, "Oslo Origo");

        let product = store
            .find_by_slug(NodeKind::Product, "oslonokkelen")
            .await
            .expect("query")
            .expect("product");
        assert_eq!(product.organization, Some(organization.id));

        assert!(store
            .find_by_slug(NodeKind::Department, "oslonokkelen")
            .await
            .expect("query")
            .is_none());
    }

    #[tokio::test]
    async fn children_queries_follow_the_right_parent_ref() {
        let store = seeded_store().await;
        let organization = store
            .find_by_slug(NodeKind::Organization, "oslo-origo")
            .await
            .expect("query")
            .expect("organization");
        let department = store
            .find_by_slug(NodeKind::Department, "apen-by")
            .await
            .expect("query")
            .expect("department");

        let departments =
            store.find_children(NodeKind::Department, &organization).await.expect("departments");
        assert_eq!(
            departments.iter().map(|node| node.slug.as_str()).collect::<Vec<_>>(),
            ["apen-by", "helseetaten"],
        );

        let org_products =
            store.find_children(NodeKind::Product, &organization).await.expect("org products");
        assert_eq!(
            org_products.iter().map(|node| node.slug.as_str()).collect::<Vec<_>>(),
            ["helseknappen", "oslonokkelen", "rusken-app"],
        );

        let department_products =
            store.find_children(NodeKind::Product, &department).await.expect("dept products");
        assert_eq!(
            department_products.iter().map(|node| node.slug.as_str()).collect::<Vec<_>>(),
            ["oslonokkelen", "rusken-app"],
        );
    }

    #[tokio::test]
    async fn undefined_parent_child_pairs_yield_no_children() {
        let store = seeded_store().await;
        let product = store
            .find_by_slug(NodeKind::Product, "oslonokkelen")
            .await
            .expect("query")
            .expect("product");

        let children =
            store.find_children(NodeKind::Department, &product).await.expect("children");
        assert!(children.is_empty());
    }
}
