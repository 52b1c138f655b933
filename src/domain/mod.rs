// Domain layer: the character sheet, the game rules, the form and the ports.

pub mod form;
pub mod model;
pub mod ports;
pub mod rules;
