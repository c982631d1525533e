//! Self-referencing parent/child hierarchies for contacts and campaigns.
//!
//! ## Submodules
//!
//! - [`source`]: the lookup capability set (`contains`, `parent_of`,
//!   `children_of`) the guard is generic over.
//! - [`snapshot`]: an in-memory [`ForestSnapshot`] implementing it.
//! - [`guard`]: [`HierarchyGuard`], the pure validate-before-commit check.
//! - [`audit`]: whole-forest integrity checks for pre-existing rows.

pub mod audit;
pub mod guard;
pub mod snapshot;
pub mod source;

pub use audit::{CyclePath, DanglingParent, ForestReport, audit_forest, has_cycles};
pub use guard::{HierarchyGuard, RejectionReason, ReparentPolicy, ValidAssignment};
pub use snapshot::ForestSnapshot;
pub use source::HierarchySource;
