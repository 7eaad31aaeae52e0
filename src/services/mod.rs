pub mod cart;
pub mod catalog;
pub mod customers;

pub use cart::CartService;
pub use catalog::CatalogService;
pub use customers::CustomerService;
