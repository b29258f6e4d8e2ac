pub mod runtime;

pub use runtime::detect_java;
pub use runtime::find_java_on_path;
pub use runtime::probe_java;
pub use runtime::JavaInstallation;
pub use runtime::DEFAULT_JAVA;
