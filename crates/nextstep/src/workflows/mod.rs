pub mod applications;
pub mod apply_flow;
pub mod identity;
