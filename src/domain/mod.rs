// Domain layer: core models, ports and the pure computation services.

pub mod model;
pub mod ports;

pub mod services;
