// Domain layer: wire-level models and the service ports the workflows run against.

pub mod model;
pub mod ports;
