//! Category tree for the item catalog.

use serde::{Deserialize, Serialize};

use crate::ids::CategoryId;

/// A node in the self-referential category tree.
///
/// The item side of the many-to-many relation lives in the store's link
/// table; the node itself only knows its parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub parent_id: Option<CategoryId>,
}

impl Category {
    /// Creates a top-level category.
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            id: CategoryId::new(),
            name: name.into(),
            parent_id: None,
        }
    }

    /// Creates a category under `parent`.
    pub fn child_of(name: impl Into<String>, parent: CategoryId) -> Self {
        Self {
            id: CategoryId::new(),
            name: name.into(),
            parent_id: Some(parent),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_points_at_parent() {
        let root = Category::root("Books");
        let child = Category::child_of("Programming", root.id);

        assert!(root.parent_id.is_none());
        assert_eq!(child.parent_id, Some(root.id));
    }
}
