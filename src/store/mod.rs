//! Policy store collaborators
//!
//! The engine reaches persistent state only through the [`PolicyStore`]
//! trait: `get`, `put` and `remove` over string keys and values.

pub mod factory;
pub mod file;
pub mod memory;
pub mod traits;

pub use factory::create_store;
pub use file::JsonFilePolicyStore;
pub use memory::InMemoryPolicyStore;
pub use traits::PolicyStore;
