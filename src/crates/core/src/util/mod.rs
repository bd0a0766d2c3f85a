pub mod errors;
pub mod text;

pub use errors::*;
pub use text::truncate_with_ellipsis;
