pub mod encoding;
pub mod masking;
pub mod time;
