//! Page resources: where spaces get their memory from.

mod accounting;
mod freelistpageresource;
mod pageresource;

pub use self::accounting::PageAccounting;
pub use self::freelistpageresource::FreeListPageResource;
pub use self::pageresource::PageResource;
