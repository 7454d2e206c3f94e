//! Type-safe wrappers for guarded paths.
//!
//! Both types are validated upon construction and cannot be created from raw
//! paths without going through validation.

pub mod resolved_path;
pub mod trusted_base;

pub use resolved_path::ResolvedPath;
pub use trusted_base::TrustedBase;
