// Integration tests for the subscription engine.
// Located in tests/ (not an inline #[cfg(test)] module) because these exercises
// rely on okrbot-db's in-memory fakes, and okrbot-db depends on okrbot-core;
// running them as integration tests keeps a single copy of okrbot-core in the
// build graph.

    use std::sync::Arc;

    use async_trait::async_trait;
    use okrbot_db::fixtures::{oslo_demo_dataset, seed_memory};
    use okrbot_db::repositories::{InMemoryCatalogStore, InMemorySubscriptionStore};

    use okrbot_core::engine::{EngineError, SubscriptionEngine};
    use okrbot_core::domain::node::NodeKind;
    use okrbot_core::domain::subscription::{ChannelId, SubscriptionRecord};
    use okrbot_core::hierarchy::HierarchyResolver;
    use okrbot_core::stores::{StoreError, SubscriptionStore};

    const ORG_DESCENDANTS: [&str; 5] =
        ["apen-by", "helseetaten", "helseknappen", "oslonokkelen", "rusken-app"];

    fn channel(id: &str) -> ChannelId {
        ChannelId(id.to_owned())
    }

    async fn engine_with_store() -> (SubscriptionEngine, Arc<InMemorySubscriptionStore>) {
        let catalog = InMemoryCatalogStore::default();
        seed_memory(&catalog, &oslo_demo_dataset()).await;
        let store = Arc::new(InMemorySubscriptionStore::default());
        let engine = SubscriptionEngine::new(
            HierarchyResolver::new(Arc::new(catalog)),
            Arc::clone(&store) as Arc<dyn SubscriptionStore>,
        );
        (engine, store)
    }

    #[tokio::test]
    async fn subscribe_creates_a_plain_entry() {
        let (engine, store) = engine_with_store().await;

        engine
            .subscribe(NodeKind::Product, "oslonokkelen", &channel("C1"))
            .await
            .expect("subscribe");

        let record = store.get("oslonokkelen").await.expect("get").expect("record");
        assert_eq!(record.kind, NodeKind::Product);
        assert_eq!(record.deep_for(&channel("C1")), Some(false));
    }

    #[tokio::test]
    async fn second_subscribe_is_rejected_and_leaves_one_entry() {
        let (engine, store) = engine_with_store().await;

        engine.subscribe(NodeKind::Product, "oslonokkelen", &channel("C1")).await.expect("first");
        let error = engine
            .subscribe(NodeKind::Product, "oslonokkelen", &channel("C1"))
            .await
            .expect_err("second must fail");

        assert_eq!(error, EngineError::AlreadySubscribed { slug: "oslonokkelen".to_owned() });
        let record = store.get("oslonokkelen").await.expect("get").expect("record");
        assert_eq!(record.channels.len(), 1);
    }

    #[tokio::test]
    async fn subscribe_to_unknown_slug_mutates_nothing() {
        let (engine, store) = engine_with_store().await;

        let error = engine
            .subscribe(NodeKind::Organization, "does-not-exist", &channel("C1"))
            .await
            .expect_err("must fail");

        assert_eq!(
            error,
            EngineError::NotFound {
                kind: NodeKind::Organization,
                slug: "does-not-exist".to_owned()
            }
        );
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn unsubscribe_removes_the_entry_but_keeps_the_record() {
        let (engine, store) = engine_with_store().await;

        engine.subscribe(NodeKind::Department, "apen-by", &channel("C1")).await.expect("subscribe");
        engine
            .unsubscribe(NodeKind::Department, "apen-by", &channel("C1"))
            .await
            .expect("unsubscribe");

        let record = store.get("apen-by").await.expect("get").expect("record kept");
        assert!(record.is_empty());

        // the retained empty record must not block a fresh subscription
        engine
            .subscribe(NodeKind::Department, "apen-by", &channel("C1"))
            .await
            .expect("re-subscribe");
    }

    #[tokio::test]
    async fn unsubscribe_distinguishes_missing_record_from_missing_entry() {
        let (engine, _store) = engine_with_store().await;

        let error = engine
            .unsubscribe(NodeKind::Department, "apen-by", &channel("C1"))
            .await
            .expect_err("no record yet");
        assert_eq!(
            error,
            EngineError::NotSubscribed { slug: "apen-by".to_owned(), record_missing: true }
        );

        engine.subscribe(NodeKind::Department, "apen-by", &channel("C2")).await.expect("subscribe");
        let error = engine
            .unsubscribe(NodeKind::Department, "apen-by", &channel("C1"))
            .await
            .expect_err("entry missing");
        assert_eq!(
            error,
            EngineError::NotSubscribed { slug: "apen-by".to_owned(), record_missing: false }
        );
    }

    #[tokio::test]
    async fn subscribe_all_covers_every_descendant_and_marks_the_root_deep() {
        let (engine, store) = engine_with_store().await;

        let report = engine
            .subscribe_all(NodeKind::Organization, "oslo-origo", &channel("C1"))
            .await
            .expect("cascade");

        assert!(report.is_clean());
        let mut applied = report.applied.clone();
        applied.sort();
        assert_eq!(applied, ORG_DESCENDANTS);

        for slug in ORG_DESCENDANTS {
            let record = store.get(slug).await.expect("get").expect("descendant record");
            assert_eq!(record.deep_for(&channel("C1")), Some(false), "descendant {slug}");
        }
        let root = store.get("oslo-origo").await.expect("get").expect("root record");
        assert_eq!(root.deep_for(&channel("C1")), Some(true));
    }

    #[tokio::test]
    async fn subscribe_all_fills_gaps_without_touching_existing_entries() {
        let (engine, store) = engine_with_store().await;

        // the product already has its own direct subscription for C2
        engine.subscribe(NodeKind::Product, "oslonokkelen", &channel("C2")).await.expect("direct");

        let report = engine
            .subscribe_all(NodeKind::Department, "apen-by", &channel("C2"))
            .await
            .expect("cascade");

        assert_eq!(report.unchanged, ["oslonokkelen"]);
        assert_eq!(report.applied, ["rusken-app"]);

        let record = store.get("oslonokkelen").await.expect("get").expect("record");
        assert_eq!(record.channels.len(), 1);
        assert_eq!(record.deep_for(&channel("C2")), Some(false));
    }

    #[tokio::test]
    async fn subscribe_all_never_downgrades_a_descendant_deep_entry() {
        let (engine, store) = engine_with_store().await;

        engine
            .subscribe_all(NodeKind::Department, "apen-by", &channel("C1"))
            .await
            .expect("department cascade");
        engine
            .subscribe_all(NodeKind::Organization, "oslo-origo", &channel("C1"))
            .await
            .expect("organization cascade");

        let department = store.get("apen-by").await.expect("get").expect("record");
        assert_eq!(department.deep_for(&channel("C1")), Some(true));
    }

    #[tokio::test]
    async fn subscribe_all_on_a_product_is_an_invalid_scope() {
        let (engine, store) = engine_with_store().await;

        let error = engine
            .subscribe_all(NodeKind::Product, "oslonokkelen", &channel("C1"))
            .await
            .expect_err("must fail");

        assert_eq!(error, EngineError::InvalidScope { kind: NodeKind::Product });
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn repeated_subscribe_all_reports_already_subscribed_after_filling_gaps() {
        let (engine, store) = engine_with_store().await;

        engine
            .subscribe_all(NodeKind::Department, "apen-by", &channel("C1"))
            .await
            .expect("first cascade");

        // simulate a partially-undone cascade: one descendant lost its entry
        let mut record = store.get("rusken-app").await.expect("get").expect("record");
        record.remove_channel(&channel("C1"));
        store.put(record).await.expect("put");

        let error = engine
            .subscribe_all(NodeKind::Department, "apen-by", &channel("C1"))
            .await
            .expect_err("root pair already present");
        assert_eq!(error, EngineError::AlreadySubscribed { slug: "apen-by".to_owned() });

        // the retry still repaired the gap before reporting the root conflict
        let repaired = store.get("rusken-app").await.expect("get").expect("record");
        assert_eq!(repaired.deep_for(&channel("C1")), Some(false));
    }

    #[tokio::test]
    async fn unsubscribe_all_tears_down_root_and_descendants() {
        let (engine, store) = engine_with_store().await;

        engine
            .subscribe_all(NodeKind::Organization, "oslo-origo", &channel("C1"))
            .await
            .expect("cascade up");
        let report = engine
            .unsubscribe_all(NodeKind::Organization, "oslo-origo", &channel("C1"))
            .await
            .expect("cascade down");

        assert!(report.is_clean());
        for slug in ORG_DESCENDANTS {
            let record = store.get(slug).await.expect("get").expect("record retained");
            assert!(!record.contains(&channel("C1")), "descendant {slug}");
        }
        let root = store.get("oslo-origo").await.expect("get").expect("root retained");
        assert!(!root.contains(&channel("C1")));

        let error = engine
            .unsubscribe_all(NodeKind::Organization, "oslo-origo", &channel("C1"))
            .await
            .expect_err("second teardown must fail");
        assert_eq!(error, EngineError::NoDeepSubscription { slug: "oslo-origo".to_owned() });
    }

    #[tokio::test]
    async fn unsubscribe_all_requires_the_deep_flag_on_the_root() {
        let (engine, _store) = engine_with_store().await;

        engine.subscribe(NodeKind::Department, "apen-by", &channel("C1")).await.expect("direct");
        let error = engine
            .unsubscribe_all(NodeKind::Department, "apen-by", &channel("C1"))
            .await
            .expect_err("direct subscription is not deep");
        assert_eq!(error, EngineError::NoDeepSubscription { slug: "apen-by".to_owned() });
    }

    #[tokio::test]
    async fn unsubscribe_all_leaves_other_channels_in_place() {
        let (engine, store) = engine_with_store().await;

        engine.subscribe(NodeKind::Product, "oslonokkelen", &channel("C2")).await.expect("direct");
        engine
            .subscribe_all(NodeKind::Department, "apen-by", &channel("C1"))
            .await
            .expect("cascade up");
        engine
            .unsubscribe_all(NodeKind::Department, "apen-by", &channel("C1"))
            .await
            .expect("cascade down");

        let record = store.get("oslonokkelen").await.expect("get").expect("record");
        assert!(record.contains(&channel("C2")));
        assert!(!record.contains(&channel("C1")));
    }

    /// Wraps the in-memory store and fails every `put` for one slug.
    struct FailingPut {
        inner: InMemorySubscriptionStore,
        poisoned_slug: String,
    }

    #[async_trait]
    impl SubscriptionStore for FailingPut {
        async fn get(&self, slug: &str) -> Result<Option<SubscriptionRecord>, StoreError> {
            self.inner.get(slug).await
        }

        async fn put(&self, record: SubscriptionRecord) -> Result<(), StoreError> {
            if record.slug == self.poisoned_slug {
                return Err(StoreError::Backend("disk full".to_owned()));
            }
            self.inner.put(record).await
        }
    }

    #[tokio::test]
    async fn a_failed_descendant_write_does_not_abort_its_siblings() {
        let catalog = InMemoryCatalogStore::default();
        seed_memory(&catalog, &oslo_demo_dataset()).await;
        let store = Arc::new(FailingPut {
            inner: InMemorySubscriptionStore::default(),
            poisoned_slug: "oslonokkelen".to_owned(),
        });
        let engine = SubscriptionEngine::new(
            HierarchyResolver::new(Arc::new(catalog)),
            Arc::clone(&store) as Arc<dyn SubscriptionStore>,
        );

        let report = engine
            .subscribe_all(NodeKind::Department, "apen-by", &channel("C1"))
            .await
            .expect("cascade completes despite the poisoned item");

        assert_eq!(report.applied, ["rusken-app"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].slug, "oslonokkelen");

        let sibling = store.get("rusken-app").await.expect("get").expect("sibling written");
        assert_eq!(sibling.deep_for(&channel("C1")), Some(false));
        assert!(store.get("oslonokkelen").await.expect("get").is_none());
    }
