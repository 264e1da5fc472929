//! Immutable, request-scoped key/value context.
//!
//! A [`Context`] is a persistent linked chain of typed bindings. Deriving a
//! child with [`Context::with_value`] never touches the parent, so any clone
//! captured earlier (for example by a spawned task) keeps seeing exactly what
//! it saw when it was captured. Clones are an `Arc` bump.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Marker for types used as keys in a [`Context`].
///
/// Keys are nominal: two different key types never collide, even when their
/// values have the same type. Keep a key type private to restrict who can
/// read or write under it.
///
/// ```
/// use ctxid::{Context, ContextKey};
///
/// struct TenantKey;
/// impl ContextKey for TenantKey {}
///
/// let ctx = Context::new().with_value::<TenantKey, _>("acme".to_string());
/// assert_eq!(ctx.get::<TenantKey, String>().map(String::as_str), Some("acme"));
/// ```
pub trait ContextKey: 'static {}

struct Node {
    key: TypeId,
    value: Arc<dyn Any + Send + Sync>,
    parent: Option<Arc<Node>>,
}

/// Immutable propagation context. Cheap to clone, safe to share across tasks.
#[derive(Clone, Default)]
pub struct Context {
    head: Option<Arc<Node>>,
}

impl Context {
    /// An empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a child context that additionally binds `value` under `K`.
    ///
    /// A binding for `K` already present in `self` is shadowed in the child
    /// and left intact in `self`.
    pub fn with_value<K, V>(&self, value: V) -> Context
    where
        K: ContextKey,
        V: Any + Send + Sync,
    {
        Context {
            head: Some(Arc::new(Node {
                key: TypeId::of::<K>(),
                value: Arc::new(value),
                parent: self.head.clone(),
            })),
        }
    }

    /// The nearest value bound under `K`, untyped.
    pub fn value<K: ContextKey>(&self) -> Option<&(dyn Any + Send + Sync)> {
        let key = TypeId::of::<K>();
        let mut node = self.head.as_deref();
        while let Some(n) = node {
            if n.key == key {
                return Some(n.value.as_ref());
            }
            node = n.parent.as_deref();
        }
        None
    }

    /// The nearest value bound under `K`, if it is a `V`.
    ///
    /// A value of any other type is reported as absent.
    pub fn get<K: ContextKey, V: Any>(&self) -> Option<&V> {
        self.value::<K>()?.downcast_ref::<V>()
    }

    /// Number of bindings in the chain, shadowed ones included.
    pub fn len(&self) -> usize {
        let mut len = 0;
        let mut node = self.head.as_deref();
        while let Some(n) = node {
            len += 1;
            node = n.parent.as_deref();
        }
        len
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("bindings", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct UserKey;
    impl ContextKey for UserKey {}

    struct TenantKey;
    impl ContextKey for TenantKey {}

    #[test]
    fn test_empty_context_has_no_values() {
        let ctx = Context::new();
        assert!(ctx.is_empty());
        assert_eq!(ctx.len(), 0);
        assert!(ctx.value::<UserKey>().is_none());
    }

    #[test]
    fn test_keys_with_same_value_type_do_not_collide() {
        let ctx = Context::new()
            .with_value::<UserKey, _>("alice".to_string())
            .with_value::<TenantKey, _>("acme".to_string());

        assert_eq!(ctx.get::<UserKey, String>().unwrap(), "alice");
        assert_eq!(ctx.get::<TenantKey, String>().unwrap(), "acme");
        assert_eq!(ctx.len(), 2);
    }

    #[test]
    fn test_child_shadows_without_touching_parent() {
        let parent = Context::new().with_value::<UserKey, _>("alice".to_string());
        let child = parent.with_value::<UserKey, _>("bob".to_string());

        assert_eq!(parent.get::<UserKey, String>().unwrap(), "alice");
        assert_eq!(child.get::<UserKey, String>().unwrap(), "bob");
    }

    #[test]
    fn test_wrong_type_reads_as_absent() {
        let ctx = Context::new().with_value::<UserKey, _>(42_u32);
        assert!(ctx.value::<UserKey>().is_some());
        assert!(ctx.get::<UserKey, String>().is_none());
        assert_eq!(ctx.get::<UserKey, u32>(), Some(&42));
    }

    #[test]
    fn test_clone_shares_bindings() {
        let ctx = Context::new().with_value::<UserKey, _>("alice".to_string());
        let clone = ctx.clone();
        drop(ctx);
        assert_eq!(clone.get::<UserKey, String>().unwrap(), "alice");
    }

    #[test]
    fn test_debug_reports_binding_count() {
        let ctx = Context::new().with_value::<UserKey, _>(1_u8);
        assert_eq!(format!("{ctx:?}"), "Context { bindings: 1 }");
    }
}
