pub mod defaults;
pub mod loader;
pub mod models;
pub mod pipeline;
pub mod validation;

#[cfg(test)]
mod test_support;
