pub mod drop;

pub use drop::DropRepository;
