pub mod observable;
pub mod registry;
