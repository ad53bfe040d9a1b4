pub mod asset;
pub mod field;
pub mod portfolio;
pub mod settings;
pub(crate) mod timestamp;
pub mod view;
