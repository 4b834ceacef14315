mod relationship_service;

pub use relationship_service::*;
