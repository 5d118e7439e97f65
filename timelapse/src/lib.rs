pub mod camera;
pub mod capture;
pub mod encoder;
pub mod frontend;
pub mod sequence;
