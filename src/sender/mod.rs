//! Sender layer - simulated message delivery

pub mod actor;

pub use actor::SenderActor;
