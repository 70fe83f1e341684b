//! `SeaORM` entity definitions.

pub mod sea_orm_active_enums;

pub mod cash_movements;
pub mod deletion_history;
pub mod products;
pub mod purchase_items;
pub mod purchases;
pub mod register_sessions;
pub mod sale_items;
pub mod sales;
pub mod shop_members;
pub mod shop_products;
pub mod shops;
pub mod stock_movements;
pub mod suppliers;
pub mod users;
