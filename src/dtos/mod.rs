pub mod envelope;
pub mod truck;
