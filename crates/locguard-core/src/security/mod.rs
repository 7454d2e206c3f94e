//! Security validation modules.

pub mod input;
pub mod path;
pub mod patterns;
pub mod symlink;

// Re-export public functions
pub use input::sanitize_input;
pub use path::try_validate;
pub use path::validate_lexically;
pub use symlink::verify_descriptor;
pub use symlink::verify_physical;
