pub mod cached_detection_source;
