pub mod customer;
pub mod forecast;
pub mod order;
pub mod product;
