pub mod exploits;
pub mod health;
