pub mod cli;
pub mod device;
pub mod element;
pub mod error;
pub mod script;
pub mod selector;
pub mod state;
pub mod trace;
pub mod view;

pub use device::Device;
pub use error::UiError;
pub use selector::session::ScriptSession;
pub use state::state_model::DeviceState;
