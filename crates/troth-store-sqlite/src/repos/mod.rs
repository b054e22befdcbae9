//! Concrete SQLite repositories, one per entity.
//!
//! Each repository owns a clone of its unit's connection (cloning is cheap,
//! the inner handle is reference-counted). Aggregates embed the repositories
//! of their sub-entities so tri-state references resolve before the row
//! write.

mod addresses;
mod contacts;
mod events;
mod names;
mod people;
mod permissions;
mod settings;
mod user_permissions;
mod users;
mod wedding;

pub use addresses::AddressRepo;
pub use contacts::ContactInfoRepo;
pub use events::EventRepo;
pub use names::NameRepo;
pub use people::PersonRepo;
pub use permissions::PermissionRepo;
pub use settings::SettingRepo;
pub use user_permissions::UserPermissionRepo;
pub use users::UserRepo;
pub use wedding::WeddingInfoRepo;
