pub mod animation;
pub mod asset;
pub mod camera;
pub mod light;
pub mod material;
pub mod mesh;
pub mod model;
pub mod texture;
pub mod utils;
pub mod world;
