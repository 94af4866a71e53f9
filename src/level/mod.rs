pub mod actuator;
pub mod mapper;
pub mod model;
pub mod pactl;
#[cfg(test)]
pub mod stubs;
