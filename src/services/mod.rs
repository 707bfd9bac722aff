pub mod upstream;
pub mod validation;
