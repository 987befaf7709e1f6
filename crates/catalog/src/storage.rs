//! Capacity-bounded file storage.
//!
//! Files of a library live in numbered sub-folders of its storage root
//! (`0/`, `1/`, `7/`, ...), each holding at most `capacity` files:
//!
//! - `folders` - enumeration of numbered folders and their files
//! - `mover` - file moves that never overwrite
//! - `allocator` - picks (or creates) a folder for a new file
//! - `rebalancer` - restores the capacity bound and merges sparse folders
//! - `root` - [`StorageRoot`], the facade tying the above to one directory

mod allocator;
mod folders;
mod mover;
mod rebalancer;
mod root;

pub use allocator::place_file;
pub use folders::{list_folders, StorageFolder};
pub use mover::{move_file, MoveOutcome};
pub use rebalancer::{rebalance, RebalanceReport};
pub use root::{StorageRoot, StorageStats};
