pub mod invocation;
pub mod settings;

pub use invocation::Invocation;
pub use settings::Settings;
