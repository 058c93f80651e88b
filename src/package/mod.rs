//! Package model and inventory.
//!
//! This module describes installed packages, their kegs and bottles, and
//! the read-only inventory the planner consults.

mod inventory;
mod model;
mod name;

pub use inventory::{InventorySnapshot, PackageInventory};
pub use model::{Bottle, Keg, Package, PackageKind};
pub use name::PackageName;
