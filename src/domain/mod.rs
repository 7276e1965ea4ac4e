// Domain layer: core models and ports (interfaces) shared by the resolver,
// renderer and adapters.

pub mod dataset;
pub mod model;
pub mod ports;
