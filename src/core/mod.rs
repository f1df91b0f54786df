pub mod blobs;
pub mod events;
pub mod store;
pub mod terminal;
