mod completion_http;
mod completion_retrying;
mod python_runner;

pub use completion_http::{API_KEY_VAR, HttpCompletionClient};
pub use completion_retrying::{RetryPolicy, RetryingCompletionClient};
pub use python_runner::{ERROR_MARKER, PythonRunner};
