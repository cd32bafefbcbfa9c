//! Record of the packages allpac installed and where they came from.

pub mod io;
pub mod types;

pub use io::RecordStore;
pub use types::{PackageList, PackageRecord};
