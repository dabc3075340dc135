pub mod object_tracker;
pub mod track_registry;
