pub mod customer;
pub mod deletion_guard;
pub mod errors;
pub mod order;
pub mod ports;
pub mod product;
