pub mod connection;
pub mod exploits;
pub mod hash_store;
pub mod kv;
pub mod rdb;
pub mod schema;
pub mod selector;
pub mod store;

pub use connection::{RdbStore, SQLITE_BACKEND};
pub use hash_store::{FieldWrite, HashStore, MemoryHashStore, RedisHashStore, MEMORY_SCHEME, REDIS_BACKEND};
pub use kv::KvStore;
pub use selector::{new_store, open_configured, open_store, BackendKind};
pub use store::ExploitStore;
