pub mod consensus;
pub mod convergence;
pub mod global_minimum;
pub mod roc;
