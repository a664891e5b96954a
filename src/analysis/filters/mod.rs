pub mod lowercase;
pub mod stopword;
