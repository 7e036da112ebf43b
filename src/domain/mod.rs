pub mod model;
pub mod publish;
pub mod validation;
