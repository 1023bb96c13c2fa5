//! Domain models for the carebase system.

mod audit;
mod care_plan;
mod client;
mod identity;
mod incident;
mod medication;
mod staff;
mod training;
mod user;

pub use audit::*;
pub use care_plan::*;
pub use client::*;
pub use identity::*;
pub use incident::*;
pub use medication::*;
pub use staff::*;
pub use training::*;
pub use user::*;
