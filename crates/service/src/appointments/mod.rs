//! Product-services microservice: assistance appointments.
//!
//! Stored records are strongly typed; the HTTP surface speaks string DTOs
//! that the mapper parses and formats.

pub mod domain;
pub mod dto;
pub mod mapper;
pub mod memory;
pub mod seaorm;
pub mod service;

pub use service::AppointmentService;
