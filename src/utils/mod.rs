pub mod paths;
pub mod regex_cache;
pub mod sanitize;
