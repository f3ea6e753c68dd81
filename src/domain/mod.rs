pub mod clustering;
pub mod dedup;
pub mod detection;
pub mod errors;
pub mod model;
pub mod prediction;
