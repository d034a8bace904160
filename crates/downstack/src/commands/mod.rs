pub mod down;
pub mod status;
