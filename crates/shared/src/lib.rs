pub mod beacon;
pub mod constants;
pub mod liveness;
pub mod validation;
