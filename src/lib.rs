pub mod form;
pub mod interaction;
pub mod prelude;
