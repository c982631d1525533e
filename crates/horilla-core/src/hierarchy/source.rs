//! The lookup capability set the guard is generic over.

use crate::model::NodeId;

/// Read access to one entity kind's parent links.
///
/// Implementors must answer from a single consistent snapshot for the
/// duration of a validation; the guard never writes through this trait.
pub trait HierarchySource {
    /// Does a node with this id exist.
    fn contains(&self, id: NodeId) -> bool;

    /// Current parent of `id`. `None` for roots and for unknown ids.
    fn parent_of(&self, id: NodeId) -> Option<NodeId>;

    /// All direct children of `id`, in ascending id order.
    fn children_of(&self, id: NodeId) -> Vec<NodeId>;
}

impl<S: HierarchySource + ?Sized> HierarchySource for &S {
    fn contains(&self, id: NodeId) -> bool {
        (**self).contains(id)
    }

    fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        (**self).parent_of(id)
    }

    fn children_of(&self, id: NodeId) -> Vec<NodeId> {
        (**self).children_of(id)
    }
}
