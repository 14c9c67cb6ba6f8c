//! Package persistence and the caching index store.

pub mod codec;
pub mod file;
pub mod memory;
pub mod store;
pub mod traits;

pub use self::file::FileStorage;
pub use self::memory::MemoryStorage;
pub use self::store::IndexStore;
pub use self::traits::{PackageStorage, StorageConfig};
