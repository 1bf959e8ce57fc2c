//! External script execution.
//!
//! The admin server converts uploaded posters by shelling out to a Python
//! optimization script. Subprocess management lives here so it can be
//! tested without an HTTP layer.

pub mod executor;
pub mod python;
pub mod subprocess;

pub use executor::{ScriptError, ScriptExecutor, ScriptInput, ScriptOutput};
pub use python::PythonExecutor;
