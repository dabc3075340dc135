pub mod meanshift_tracker;
pub mod ncc_tracker;
pub mod tracker_factory;
