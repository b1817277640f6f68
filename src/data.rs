mod filesystem_access;
mod package_metadata;
mod requirements;

pub use filesystem_access::FsAccess;
pub use package_metadata::*;
pub use requirements::*;
