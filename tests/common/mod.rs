#[macro_use]
pub mod test_utils;
pub mod phoenix_glb;
