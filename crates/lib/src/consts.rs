/// Per-stack subdirectories created under `<install_dir>/<stack>/`.
pub const SCRATCH_DIR: &str = "scratch";
pub const INSTALL_DIR: &str = "install";
pub const BUILD_DIR: &str = "build";
pub const SRC_DIR: &str = "src";
pub const MODULEFILES_DIR: &str = "modulefiles";

/// Marker file written into a component's install directory once it is fully installed.
pub const INSTALL_COMPLETE_MARKER: &str = ".stackbuild-complete";

/// Start marker of a reference token, e.g. `@ref:foo_install_dir@`.
pub const REF_START: &str = "@ref:";
/// End marker of a reference token.
pub const REF_END: char = '@';

/// Environment variable overriding the install directory of the stack config document.
pub const ENV_INSTALL_DIR: &str = "STACKBUILD_INSTALL_DIR";
/// Environment variable providing the default path of the stack definition document.
pub const ENV_DEFINITION: &str = "STACKBUILD_DEFINITION";
/// Environment variable providing the default path of the stack config document.
pub const ENV_CONFIG: &str = "STACKBUILD_CONFIG";

/// Unix permission bits used for directories created by the orchestrator.
pub const DIR_MODE: u32 = 0o775;
