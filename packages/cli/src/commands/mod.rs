pub mod apply;
pub mod drop;
pub mod init;
pub mod inspect;

pub use apply::{apply, ApplyArgs};
pub use drop::{drop, DropArgs};
pub use init::{init, InitArgs};
pub use inspect::{inspect, InspectArgs};
