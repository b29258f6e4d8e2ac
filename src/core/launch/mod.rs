pub mod task;

pub use task::{build_command, check_java, launch};
