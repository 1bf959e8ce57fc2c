pub mod convert;
pub mod data;
pub mod images;
