pub use self::{grid::*, matcher::*, piece::*, position::*};

pub(crate) mod grid;
pub mod matcher;
pub(crate) mod piece;
pub(crate) mod position;
