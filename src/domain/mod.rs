// Domain layer: bundle/report models and the command port. No process or filesystem adapters here.

pub mod model;
pub mod ports;
