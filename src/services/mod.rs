pub mod bearer;
