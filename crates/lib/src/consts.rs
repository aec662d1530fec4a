/// Default manifest location, relative to the working directory.
pub const DEFAULT_MANIFEST: &str = "scripts/manifest.xml";

/// Default build directory, relative to the working directory.
pub const DEFAULT_BUILD_DIR: &str = "build";

/// Reserved sentinel replaced with the package directory identifier before
/// any key substitution happens.
pub const DEB_DIR_SENTINEL: &str = "{DEB_DIR}";

/// Context key under which the package directory identifier is exposed.
pub const DEB_DIR_KEY: &str = "DEB_DIR";

/// Maintainer scripts that must always be executable.
pub const LIFECYCLE_HOOKS: [&str; 2] = ["prerm", "postinst"];

/// Execute bits for owner, group and others.
pub const EXEC_BITS: u32 = 0o111;

/// Archive extension produced by the packaging backend.
pub const ARCHIVE_EXT: &str = "deb";
