//! Progress reporting while a quiz is generated

pub mod reporter;
