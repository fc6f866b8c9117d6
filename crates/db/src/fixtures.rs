//! Deterministic demo catalog used by `okrbot seed` and by tests.

use okrbot_core::domain::node::Node;

use crate::repositories::InMemoryCatalogStore;
use crate::DbPool;

#[derive(Clone, Debug)]
pub struct SeedDataset {
    pub organizations: Vec<Node>,
    pub departments: Vec<Node>,
    pub products: Vec<Node>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub organizations: usize,
    pub departments: usize,
    pub products: usize,
}

/// The Oslo Origo demo hierarchy: one organization, two departments,
/// three products.
pub fn oslo_demo_dataset() -> SeedDataset {
    let organization = Node::organization("org-oslo-origo", "oslo-origo", "Oslo Origo");
    let apen_by =
        Node::department("dep-apen-by", "apen-by", "Åpen by", organization.id.clone());
    let helseetaten =
        Node::department("dep-helseetaten", "helseetaten", "Helseetaten", organization.id.clone());
    let products = vec![
        Node::product(
            "prod-oslonokkelen",
            "oslonokkelen",
            "Oslonøkkelen",
            organization.id.clone(),
            apen_by.id.clone(),
        ),
        Node::product(
            "prod-rusken-app",
            "rusken-app",
            "Rusken-appen",
            organization.id.clone(),
            apen_by.id.clone(),
        ),
        Node::product(
            "prod-helseknappen",
            "helseknappen",
            "Helseknappen",
            organization.id.clone(),
            helseetaten.id.clone(),
        ),
    ];

    SeedDataset {
        organizations: vec![organization],
        departments: vec![apen_by, helseetaten],
        products,
    }
}

/// Upserts the dataset into the catalog tables. Idempotent: re-seeding
/// overwrites rows by id without duplicating them.
pub async fn seed_catalog(pool: &DbPool, dataset: &SeedDataset) -> Result<SeedReport, sqlx::Error> {
    for node in &dataset.organizations {
        sqlx::query(
            "INSERT INTO organizations (id, slug, name) VALUES (?1, ?2, ?3)
             ON CONFLICT (id) DO UPDATE SET slug = excluded.slug, name = excluded.name",
        )
        .bind(&node.id.0)
        .bind(&node.slug)
        .bind(&node.name)
        .execute(pool)
        .await?;
    }

    for node in &dataset.departments {
        let organization = node.organization.as_ref().map(|id| id.0.as_str());
        sqlx::query(
            "INSERT INTO departments (id, slug, name, organization_id) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (id) DO UPDATE
             SET slug = excluded.slug, name = excluded.name,
                 organization_id = excluded.organization_id",
        )
        .bind(&node.id.0)
        .bind(&node.slug)
        .bind(&node.name)
        .bind(organization)
        .execute(pool)
        .await?;
    }

    for node in &dataset.products {
        let organization = node.organization.as_ref().map(|id| id.0.as_str());
        let department = node.department.as_ref().map(|id| id.0.as_str());
        sqlx::query(
            "INSERT INTO products (id, slug, name, organization_id, department_id)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (id) DO UPDATE
             SET slug = excluded.slug, name = excluded.name,
                 organization_id = excluded.organization_id,
                 department_id = excluded.department_id",
        )
        .bind(&node.id.0)
        .bind(&node.slug)
        .bind(&node.name)
        .bind(organization)
        .bind(department)
        .execute(pool)
        .await?;
    }

    Ok(SeedReport {
        organizations: dataset.organizations.len(),
        departments: dataset.departments.len(),
        products: dataset.products.len(),
    })
}

/// Loads the dataset into an in-memory catalog fake.
pub async fn seed_memory(catalog: &InMemoryCatalogStore, dataset: &SeedDataset) {
    for node in dataset
        .organizations
        .iter()
        .chain(dataset.departments.iter())
        .chain(dataset.products.iter())
    {
        catalog.insert(node.clone()).await;
    }
}
