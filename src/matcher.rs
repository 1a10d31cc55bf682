mod model;
mod names;
mod tokens;

pub(crate) use model::*;
pub(crate) use names::*;
pub(crate) use tokens::*;
