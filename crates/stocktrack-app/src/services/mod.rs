//! # Service Layer
//!
//! Facades the UI host calls. Every method returns `Result<T, ApiError>`
//! so the host sees one serializable error shape regardless of which layer
//! refused the operation.
//!
//! ## Available Services
//!
//! - [`category::CategoryService`] - category CRUD
//! - [`product::ProductService`] - product CRUD and the low-stock view
//! - [`movement::MovementService`] - the four ledger operations
//! - [`store::StoreService`] - store file management (list/create/switch/backup)

pub mod category;
pub mod movement;
pub mod product;
pub mod store;

pub use category::CategoryService;
pub use movement::MovementService;
pub use product::ProductService;
pub use store::{StoreInfo, StoreService};
