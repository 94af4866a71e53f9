pub mod controller;
pub mod locator;
pub mod model;
