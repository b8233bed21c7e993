//! Read-only entity metadata.
//!
//! The schema is supplied by an external metadata service and consumed
//! as-is: the store never mutates it, it only consults property flags and
//! relationship semantics when an operation crosses entity boundaries.

use crate::types::TypeRef;

/// How a relationship participates in hierarchical containment.
///
/// The same store code handles all three styles; behavior differences are
/// dispatched by matching on this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipStyle {
    /// Plain association with no containment semantics.
    Link,
    /// Points at the owning parent; deleting the parent deletes this node.
    Parent,
    /// Points at owned children; unlinking a child deletes it.
    Child,
}

/// A property definition on an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// Property name, the key in a node's property map.
    pub name: String,
    /// Human-readable label used in validation messages.
    pub label: String,
    /// Declared value type name (informational).
    pub type_name: String,
    /// Whether every node must carry a value.
    pub required: bool,
    /// Whether values must be distinct across the store.
    pub unique: bool,
    /// Whether the store may default the value from the node key.
    pub auto_generated: bool,
}

impl Property {
    /// Creates a property with all flags off.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            type_name: type_name.into(),
            required: false,
            unique: false,
            auto_generated: false,
        }
    }

    /// Marks the property as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Marks the property as unique.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Marks the property as auto-generated.
    #[must_use]
    pub fn auto_generated(mut self) -> Self {
        self.auto_generated = true;
        self
    }
}

/// A relationship definition on an entity.
///
/// A relationship is primary on exactly one side of a pair; the other
/// side is derived by scanning the opposite store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship name, the key in a node's `related` map.
    pub name: String,
    /// Human-readable label used in validation messages.
    pub label: String,
    /// Name of the opposite relationship on the target entity.
    pub opposite: String,
    /// Containment style.
    pub style: RelationshipStyle,
    /// Whether this side stores the references.
    pub primary: bool,
    /// Whether at least one reference must be present.
    pub required: bool,
    /// Whether more than one reference may be present.
    pub multiple: bool,
    /// The target entity type.
    pub type_ref: TypeRef,
}

impl Relationship {
    /// Creates a non-primary, optional, single-valued relationship.
    pub fn new(name: impl Into<String>, type_ref: TypeRef, style: RelationshipStyle) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            opposite: String::new(),
            style,
            primary: false,
            required: false,
            multiple: false,
            type_ref,
        }
    }

    /// Names the opposite relationship on the target entity.
    #[must_use]
    pub fn opposite(mut self, name: impl Into<String>) -> Self {
        self.opposite = name.into();
        self
    }

    /// Marks this side as the one storing the references.
    #[must_use]
    pub fn primary(mut self) -> Self {
        self.primary = true;
        self
    }

    /// Marks the relationship as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Allows more than one reference.
    #[must_use]
    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }
}

/// An entity type definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    /// The entity's type reference.
    pub type_ref: TypeRef,
    /// Human-readable label used in validation messages.
    pub label: String,
    /// Supertypes this entity conforms to.
    pub super_types: Vec<TypeRef>,
    /// Property definitions.
    pub properties: Vec<Property>,
    /// Relationship definitions.
    pub relationships: Vec<Relationship>,
}

impl Entity {
    /// Creates an entity with no members.
    pub fn new(type_ref: TypeRef) -> Self {
        Self {
            label: type_ref.name.clone(),
            type_ref,
            super_types: Vec::new(),
            properties: Vec::new(),
            relationships: Vec::new(),
        }
    }

    /// Adds a property definition.
    #[must_use]
    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    /// Adds a relationship definition.
    #[must_use]
    pub fn with_relationship(mut self, relationship: Relationship) -> Self {
        self.relationships.push(relationship);
        self
    }

    /// Adds a supertype.
    #[must_use]
    pub fn with_super_type(mut self, super_type: TypeRef) -> Self {
        self.super_types.push(super_type);
        self
    }

    /// Looks up a property by name.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Looks up a relationship by name.
    pub fn relationship(&self, name: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|r| r.name == name)
    }
}

/// The full set of entity definitions shared by a catalog's stores.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    entities: Vec<Entity>,
}

impl Schema {
    /// Creates a schema from its entity definitions.
    pub fn new(entities: Vec<Entity>) -> Self {
        Self { entities }
    }

    /// Returns every entity definition.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Looks up an entity by type reference.
    pub fn entity(&self, type_ref: &TypeRef) -> Option<&Entity> {
        self.entities.iter().find(|e| &e.type_ref == type_ref)
    }

    /// Resolves the opposite side of a relationship.
    pub fn opposite(&self, relationship: &Relationship) -> Option<&Relationship> {
        self.entity(&relationship.type_ref)
            .and_then(|target| target.relationship(&relationship.opposite))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schema() -> Schema {
        let owner = TypeRef::new("sample", "Owner");
        let pet = TypeRef::new("sample", "Pet");
        Schema::new(vec![
            Entity::new(owner.clone()).with_relationship(
                Relationship::new("pets", pet.clone(), RelationshipStyle::Child)
                    .opposite("owner")
                    .multiple(),
            ),
            Entity::new(pet.clone()).with_relationship(
                Relationship::new("owner", owner.clone(), RelationshipStyle::Parent)
                    .opposite("pets")
                    .primary()
                    .required(),
            ),
        ])
    }

    #[test]
    fn entity_lookup_by_type_ref() {
        let schema = sample_schema();
        let owner = TypeRef::new("sample", "Owner");
        assert!(schema.entity(&owner).is_some());
        assert!(schema.entity(&TypeRef::new("sample", "Missing")).is_none());
    }

    #[test]
    fn opposite_resolution_crosses_entities() {
        let schema = sample_schema();
        let pet = schema.entity(&TypeRef::new("sample", "Pet")).unwrap();
        let owner_rel = pet.relationship("owner").unwrap();

        let opposite = schema.opposite(owner_rel).unwrap();
        assert_eq!(opposite.name, "pets");
        assert!(opposite.multiple);
        assert!(!opposite.primary);
    }

    #[test]
    fn builder_flags_stick() {
        let property = Property::new("serial", "String").unique().auto_generated();
        assert!(property.unique);
        assert!(property.auto_generated);
        assert!(!property.required);
    }
}
