//! Index handle types for search index operations.

use uuid::Uuid;

/// A reference to a physical index behind the configured alias.
///
/// The live index is addressed through the alias itself, so single-document
/// writes always land on whichever physical index is currently promoted.
/// A shadow handle names a concrete physical index (`{alias}_{uuid}`) that is
/// being populated during a rebuild and is not yet visible to readers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexHandle {
    /// Index name as known to the search backend.
    pub physical_name: String,
}

impl IndexHandle {
    /// Handle addressing the live index through its alias.
    pub fn live(alias: &str) -> Self {
        Self {
            physical_name: alias.to_string(),
        }
    }

    /// Handle for a fresh shadow index under the given alias.
    ///
    /// The random suffix lets a shadow coexist with the live index until the
    /// alias is swapped over.
    pub fn shadow(alias: &str) -> Self {
        Self {
            physical_name: format!("{}_{}", alias, Uuid::new_v4().simple()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_handle_uses_alias() {
        let handle = IndexHandle::live("packages");
        assert_eq!(handle.physical_name, "packages");
    }

    #[test]
    fn test_shadow_handle_is_prefixed_and_unique() {
        let a = IndexHandle::shadow("packages");
        let b = IndexHandle::shadow("packages");

        assert!(a.physical_name.starts_with("packages_"));
        assert!(b.physical_name.starts_with("packages_"));
        assert_ne!(a, b);
    }
}
