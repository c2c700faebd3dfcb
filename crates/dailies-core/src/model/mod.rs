mod genome;
mod movie;
mod rating;
mod tag;

pub use genome::{GenomeScore, GenomeTag};
pub use movie::Movie;
pub use rating::Rating;
pub use tag::Tag;
