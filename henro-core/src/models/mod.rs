mod document;
mod geo_point;
mod key;
mod value;

pub use document::Document;
pub use geo_point::GeoPoint;
pub use key::{DocumentKey, KeyError};
pub use value::Value;
