pub mod layout;
pub mod reader;
#[cfg(any(test, feature = "test-utils"))]
#[doc(hidden)]
pub mod test_utils;


pub use layout::{SlotHeader, SlotPersistentData, BODY_SIZE, HEADER_SIZE, SLOT_MAGIC};
pub use reader::{decode_state, read_slot_dir, read_state_file, ReadOptions};
