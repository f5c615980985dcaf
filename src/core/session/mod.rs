pub mod context;
pub mod state;

pub use context::InvocationContext;
pub use state::{SessionState, keys};
