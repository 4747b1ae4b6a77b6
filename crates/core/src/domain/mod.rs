pub mod campaign;
pub mod promotion;
pub mod settings;
