pub mod inverted;
pub mod posting;
pub mod store;
pub mod index_writer;
