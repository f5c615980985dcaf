pub mod text;

pub use text::{capitalize, truncate_with_ellipsis};
