pub mod catalog;
pub mod fuse;
pub mod play;
