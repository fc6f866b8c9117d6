use std::collections::HashMap;

use tokio::sync::RwLock;

use okrbot_core::domain::node::{Node, NodeId, NodeKind};
use okrbot_core::domain::subscription::SubscriptionRecord;
use okrbot_core::stores::{CatalogStore, StoreError, SubscriptionStore};

/// Catalog fake for tests and local development.
#[derive(Default)]
pub struct InMemoryCatalogStore {
    nodes: RwLock<Vec<Node>>,
}

impl InMemoryCatalogStore {
    pub async fn insert(&self, node: Node) {
        let mut nodes = self.nodes.write().await;
        nodes.push(node);
    }
}

fn parent_ref<'a>(node: &'a Node, parent_kind: NodeKind) -> Option<&'a NodeId> {
    match parent_kind {
        NodeKind::Organization => node.organization.as_ref(),
        NodeKind::Department => node.department.as_ref(),
        NodeKind::Product => None,
    }
}

#[async_trait::async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn find_by_slug(&self, kind: NodeKind, slug: &str) -> Result<Option<Node>, StoreError> {
        let nodes = self.nodes.read().await;
        Ok(nodes.iter().find(|node| node.kind == kind && node.slug == slug).cloned())
    }

    async fn find_children(
        &self,
        child_kind: NodeKind,
        parent: &Node,
    ) -> Result<Vec<Node>, StoreError> {
        let nodes = self.nodes.read().await;
        let mut children: Vec<Node> = nodes
            .iter()
            .filter(|node| {
                node.kind == child_kind && parent_ref(node, parent.kind) == Some(&parent.id)
            })
            .cloned()
            .collect();
        children.sort_by(|left, right| left.slug.cmp(&right.slug));
        Ok(children)
    }
}

/// Subscription-store fake with the same whole-document semantics as
/// the SQL implementation.
#[derive(Default)]
pub struct InMemorySubscriptionStore {
    records: RwLock<HashMap<String, SubscriptionRecord>>,
}

impl InMemorySubscriptionStore {
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl SubscriptionStore for InMemorySubscriptionStore {
    async fn get(&self, slug: &str) -> Result<Option<SubscriptionRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records.get(slug).cloned())
    }

    async fn put(&self, record: SubscriptionRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        records.insert(record.slug.clone(), record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use okrbot_core::domain::node::{Node, NodeKind};
    use okrbot_core::domain::subscription::{ChannelId, SubscriptionRecord};
    use okrbot_core::stores::{CatalogStore, SubscriptionStore};

    use super::{InMemoryCatalogStore, InMemorySubscriptionStore};

    #[tokio::test]
    async fn catalog_matches_children_by_the_parent_kind_ref() {
        let catalog = InMemoryCatalogStore::default();
        let organization = Node::organization("org-1", "oslo-origo", "Oslo Origo");
        let department =
            Node::department("dep-1", "apen-by", "Åpen by", organization.id.clone());
        let product = Node::product(
            "prod-1",
            "oslonokkelen",
            "Oslonøkkelen",
            organization.id.clone(),
            department.id.clone(),
        );
        catalog.insert(organization.clone()).await;
        catalog.insert(department.clone()).await;
        catalog.insert(product.clone()).await;

        let departments =
            catalog.find_children(NodeKind::Department, &organization).await.expect("children");
        assert_eq!(departments, [department.clone()]);

        let products =
            catalog.find_children(NodeKind::Product, &department).await.expect("children");
        assert_eq!(products, [product]);
    }

    #[tokio::test]
    async fn subscription_store_round_trips_and_overwrites() {
        let store = InMemorySubscriptionStore::default();
        assert!(store.is_empty().await);

        let mut record = SubscriptionRecord::new(NodeKind::Department, "apen-by");
        record.push_channel(ChannelId("C1".into()), true);
        store.put(record.clone()).await.expect("put");
        assert_eq!(store.get("apen-by").await.expect("get"), Some(record.clone()));

        record.remove_channel(&ChannelId("C1".into()));
        store.put(record.clone()).await.expect("overwrite");
        assert_eq!(store.get("apen-by").await.expect("get"), Some(record));
    }
}
