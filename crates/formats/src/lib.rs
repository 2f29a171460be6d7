pub mod address_list;

pub use address_list::*;
