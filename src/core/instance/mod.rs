pub mod manager;
pub mod model;

pub use manager::{accept_eula, InstanceManager};
pub use model::InstanceConfig;
