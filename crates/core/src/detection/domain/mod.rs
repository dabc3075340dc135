pub mod detection;
pub mod detection_schedule;
pub mod detection_source;
