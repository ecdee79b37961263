pub mod bed;
pub mod bin_map;
pub mod location;
