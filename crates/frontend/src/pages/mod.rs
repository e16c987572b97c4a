pub mod editor;
pub mod home;
