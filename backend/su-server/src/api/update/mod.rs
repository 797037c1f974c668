pub mod staging;
pub mod update_self;
