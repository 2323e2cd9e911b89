pub mod drops;
pub mod images;
pub mod search;
