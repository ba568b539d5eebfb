// Mode coordination and session hosting: one DocumentSession per open resume,
// registered in a SessionStore and driven by the renderer through the handlers.

pub mod coordinator;
pub mod handlers;
pub mod store;

pub use coordinator::{DocumentSession, HitPath, ViewMode};
pub use store::{InMemorySessionStore, SessionStore, StoreError};
