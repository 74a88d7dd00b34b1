pub mod controls;
pub mod surface;
pub mod video;
