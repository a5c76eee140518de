use std::fmt;
use std::sync::Arc;

/// Opaque token identifying one live shared allocation.
///
/// Two handles report the same token exactly when they point at the same allocation. The token is
/// derived from the allocation address, so it is stable for as long as any handle keeps the
/// allocation alive and may be reused once the last handle drops.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorageId(usize);

impl StorageId {
    pub fn of<T: ?Sized>(handle: &Arc<T>) -> Self {
        Self(Arc::as_ptr(handle) as *const () as usize)
    }
}

impl fmt::Display for StorageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
