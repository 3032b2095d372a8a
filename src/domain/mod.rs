//! Domain model of the asset build pipeline
//!
//! Entities and value objects are plain data; services hold the build logic;
//! ports are the seams to the outside (engine, snapshot store, serializers).

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
