pub mod descriptor_pool;
pub mod histogram_descriptor;
pub mod json_catalog_store;
