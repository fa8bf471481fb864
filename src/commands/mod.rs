pub(crate) mod compose;
mod run;
pub(crate) mod validate;
