//! Data structures representing database entities.

pub mod cart_item;
pub mod order;
pub mod order_item;
pub mod product;
pub mod user;

pub use cart_item::{CartItem, CartLine};
pub use order::{Order, OrderStatus};
pub use order_item::{OrderItem, OrderLineDetail};
pub use product::Product;
pub use user::User;
