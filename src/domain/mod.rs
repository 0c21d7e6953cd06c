// Domain layer: board state, protocol values and ports (interfaces).

pub mod board;
pub mod model;
pub mod ports;
