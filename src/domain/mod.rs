// Domain layer: catalog models and the ports the service is assembled from.

pub mod model;
pub mod ports;
