pub mod codec;
pub mod controller;
pub mod error;
pub mod projector;
pub mod repository;
pub mod workout;
