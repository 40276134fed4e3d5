// Domain layer: core models, plugin events and the host calendar port.

pub mod events;
pub mod model;
pub mod ports;
