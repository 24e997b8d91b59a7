pub mod api;
pub mod coordinator;
pub mod fields;
pub mod model;
pub mod normalize;
pub mod status;
pub mod value;

pub use api::Error;
