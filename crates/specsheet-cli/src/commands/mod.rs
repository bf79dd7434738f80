pub mod detect;
pub mod parse;
pub mod templates;
pub mod validate;
