pub mod scenario;
pub mod simulate;
