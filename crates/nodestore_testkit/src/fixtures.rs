//! Catalog fixtures and a reference schema.
//!
//! The tracker schema is deliberately small but covers every relationship
//! kind the store distinguishes: a primary parent side with a non-primary
//! child inverse, an optional link, and a required link.

use nodestore_core::{
    Entity, Node, NodeStoreCatalog, NodeStoreHandle, Property, Relationship, RelationshipStyle,
    Schema, TypeRef,
};
use std::path::Path;
use tempfile::TempDir;

/// Type reference for the tracker project entity.
pub fn project_type() -> TypeRef {
    TypeRef::new("tracker", "Project")
}

/// Type reference for the tracker issue entity.
pub fn issue_type() -> TypeRef {
    TypeRef::new("tracker", "Issue")
}

/// Type reference for the tracker user entity.
pub fn user_type() -> TypeRef {
    TypeRef::new("tracker", "User")
}

/// Builds the issue-tracker schema.
///
/// - `Project.issues` is a non-primary, multi-valued child list; the
///   primary side is `Issue.project`, a required parent link.
/// - `Issue.assignee` is an optional primary link; `User.assigned` is its
///   non-primary inverse.
/// - `Issue.reporter` is a required primary link; `User.reported` is its
///   non-primary inverse.
pub fn tracker_schema() -> Schema {
    let project = project_type();
    let issue = issue_type();
    let user = user_type();

    Schema::new(vec![
        Entity::new(project.clone())
            .with_property(Property::new("name", "String").required().unique())
            .with_property(Property::new("code", "String").unique().auto_generated())
            .with_relationship(
                Relationship::new("issues", issue.clone(), RelationshipStyle::Child)
                    .opposite("project")
                    .multiple(),
            ),
        Entity::new(issue.clone())
            .with_property(Property::new("summary", "String").required())
            .with_property(Property::new("status", "String"))
            .with_relationship(
                Relationship::new("project", project.clone(), RelationshipStyle::Parent)
                    .opposite("issues")
                    .primary()
                    .required(),
            )
            .with_relationship(
                Relationship::new("assignee", user.clone(), RelationshipStyle::Link)
                    .opposite("assigned")
                    .primary(),
            )
            .with_relationship(
                Relationship::new("reporter", user.clone(), RelationshipStyle::Link)
                    .opposite("reported")
                    .primary()
                    .required(),
            ),
        Entity::new(user.clone())
            .with_property(Property::new("username", "String").required().unique())
            .with_relationship(
                Relationship::new("assigned", issue.clone(), RelationshipStyle::Link)
                    .opposite("assignee")
                    .multiple(),
            )
            .with_relationship(
                Relationship::new("reported", issue, RelationshipStyle::Link)
                    .opposite("reporter")
                    .multiple(),
            ),
    ])
}

/// A project node with the given name.
pub fn project(name: &str) -> Node {
    Node::new(project_type().full_name()).with_property("name", name)
}

/// An issue node with the given summary.
pub fn issue(summary: &str) -> Node {
    Node::new(issue_type().full_name()).with_property("summary", summary)
}

/// A user node with the given username.
pub fn user(username: &str) -> Node {
    Node::new(user_type().full_name()).with_property("username", username)
}

/// A tracker catalog over a temporary snapshot directory, with automatic
/// cleanup.
pub struct TestCatalog {
    /// The catalog instance.
    pub catalog: NodeStoreCatalog,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: TempDir,
}

impl TestCatalog {
    /// Creates a catalog over the tracker schema in a fresh directory.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let catalog = NodeStoreCatalog::new(tracker_schema(), temp_dir.path());
        Self {
            catalog,
            _temp_dir: temp_dir,
        }
    }

    /// The snapshot root directory.
    pub fn root(&self) -> &Path {
        self.catalog.root()
    }

    /// Opens a second catalog over the same snapshot directory, as a
    /// process restart would.
    pub fn reopen(&self) -> NodeStoreCatalog {
        NodeStoreCatalog::new(tracker_schema(), self.root())
    }

    /// The project store handle.
    pub fn projects(&self) -> NodeStoreHandle {
        self.catalog
            .store(&project_type())
            .expect("Failed to open project store")
    }

    /// The issue store handle.
    pub fn issues(&self) -> NodeStoreHandle {
        self.catalog
            .store(&issue_type())
            .expect("Failed to open issue store")
    }

    /// The user store handle.
    pub fn users(&self) -> NodeStoreHandle {
        self.catalog
            .store(&user_type())
            .expect("Failed to open user store")
    }
}

impl Default for TestCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for TestCatalog {
    type Target = NodeStoreCatalog;

    fn deref(&self) -> &Self::Target {
        &self.catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_inverses_resolve_both_ways() {
        let schema = tracker_schema();
        let issue = schema.entity(&issue_type()).unwrap();
        let project_rel = issue.relationship("project").unwrap();

        let inverse = schema.opposite(project_rel).unwrap();
        assert_eq!(inverse.name, "issues");
        assert!(!inverse.primary);
        assert_eq!(schema.opposite(inverse).unwrap().name, "project");
    }

    #[test]
    fn catalog_opens_every_tracker_store() {
        let catalog = TestCatalog::new();
        assert!(catalog.projects().node_keys().unwrap().is_empty());
        assert!(catalog.issues().node_keys().unwrap().is_empty());
        assert!(catalog.users().node_keys().unwrap().is_empty());
    }
}
