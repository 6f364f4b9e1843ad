// Domain layer: rental models and the ports the core talks to. No I/O here.

pub mod model;
pub mod ports;
