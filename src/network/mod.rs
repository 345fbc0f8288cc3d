pub mod model;
pub mod network;
pub mod spec;

pub use model::Model;
pub use network::Network;
pub use spec::{LayerSpec, NetworkSpec};
