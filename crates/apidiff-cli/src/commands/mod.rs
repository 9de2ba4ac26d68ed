pub mod compare;
pub mod load;
