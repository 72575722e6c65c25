// Domain layer: core models and ports (interfaces), including the parsing backend seam.

pub mod model;
pub mod parsing;
pub mod ports;
