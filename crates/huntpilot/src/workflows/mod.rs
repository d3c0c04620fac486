pub mod applications;
pub mod followups;
