pub mod interaction;
pub mod product;
pub mod tag;
