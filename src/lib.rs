// Aquaponics monitor - Sensor chart shaping and dashboard service
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
