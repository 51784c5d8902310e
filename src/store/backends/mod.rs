pub mod local;
pub mod remote;

pub use local::{LocalStore, TrackerDocument};
pub use remote::RemoteStore;
