pub mod check;
pub mod packages;
