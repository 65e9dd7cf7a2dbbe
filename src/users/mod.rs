//! User-store collaborator: the credential records the auth pipeline reads
//! and the narrow storage contract it depends on.

pub mod model;
pub mod store;

pub use model::{NewUser, User, UserResponse};
pub use store::{MemoryUserStore, SharedUserStore, StoreError, UserStore};
