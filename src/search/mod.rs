pub mod prefix;
pub mod wildcard;
pub mod fuzzy;
pub mod results;
pub mod executor;
