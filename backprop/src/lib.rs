pub use self::config::{LayerConfig, NetworkConfig};
pub use self::error::BackpropError;
pub use self::flatten::{multi_flatten, multi_unflatten, Manifest};
pub use self::network::{deep_cost_gradient, shallow_cost_gradient, Activation, Network};

pub mod flatten;
pub mod gradient_check;
pub mod linear_algebra;
pub mod loss;
pub mod synthetic;

mod activation;
mod config;
mod error;
mod layer;
mod network;
