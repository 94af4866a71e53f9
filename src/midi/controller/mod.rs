pub mod midir;
#[cfg(test)]
pub mod stubs;
