use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kinds of catalog nodes, ordered root to leaf.
///
/// The catalog hierarchy is fixed: organizations own departments,
/// departments own products. Products have no children.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Organization,
    Department,
    Product,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Organization => "organization",
            Self::Department => "department",
            Self::Product => "product",
        }
    }

    /// Cascading subscriptions stop at the department level.
    pub fn allows_cascade(self) -> bool {
        matches!(self, Self::Organization | Self::Department)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown node kind `{0}`")]
pub struct ParseNodeKindError(pub String);

impl FromStr for NodeKind {
    type Err = ParseNodeKindError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "organization" => Ok(Self::Organization),
            "department" => Ok(Self::Department),
            "product" => Ok(Self::Product),
            other => Err(ParseNodeKindError(other.to_owned())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub String);

/// A read-only catalog entry. Ownership of catalog data sits with the
/// OKR tracker itself; the bot only resolves slugs and walks parents.
///
/// Departments carry their owning `organization`; products carry both
/// `organization` and `department` so an organization-level cascade can
/// reach them without walking through the department.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub slug: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<NodeId>,
}

impl Node {
    pub fn organization(id: impl Into<String>, slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: NodeId(id.into()),
            kind: NodeKind::Organization,
            slug: slug.into(),
            name: name.into(),
            organization: None,
            department: None,
        }
    }

    pub fn department(
        id: impl Into<String>,
        slug: impl Into<String>,
        name: impl Into<String>,
        organization: NodeId,
    ) -> Self {
        Self {
            id: NodeId(id.into()),
            kind: NodeKind::Department,
            slug: slug.into(),
            name: name.into(),
            organization: Some(organization),
            department: None,
        }
    }

    pub fn product(
        id: impl Into<String>,
        slug: impl Into<String>,
        name: impl Into<String>,
        organization: NodeId,
        department: NodeId,
    ) -> Self {
        Self {
            id: NodeId(id.into()),
            kind: NodeKind::Product,
            slug: slug.into(),
            name: name.into(),
            organization: Some(organization),
            department: Some(department),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::NodeKind;

    #[test]
    fn node_kind_round_trips_through_display_and_from_str() {
        for kind in [NodeKind::Organization, NodeKind::Department, NodeKind::Product] {
            assert_eq!(kind.to_string().parse::<NodeKind>(), Ok(kind));
        }
    }

    #[test]
    fn node_kind_rejects_unknown_scope_tokens() {
        assert!("team".parse::<NodeKind>().is_err());
        assert!("Organization".parse::<NodeKind>().is_err());
        assert!("".parse::<NodeKind>().is_err());
    }

    #[test]
    fn cascade_is_disallowed_below_department() {
        assert!(NodeKind::Organization.allows_cascade());
        assert!(NodeKind::Department.allows_cascade());
        assert!(!NodeKind::Product.allows_cascade());
    }
}
