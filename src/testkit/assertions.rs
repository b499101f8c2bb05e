//! Assertion macros for engine results.
//!
//! - [`crate::assert_result_ok!`] - Assert Result is Ok and extract value
//! - [`crate::assert_result_err!`] - Assert Result is Err and extract error
//! - [`crate::assert_contains_error!`] - Assert error message contains pattern
//!
//! # Example
//!
//! ```rust
//! use gapmap::{assert_contains_error, assert_result_ok};
//!
//! let result: Result<i32, String> = Ok(42);
//! assert_eq!(assert_result_ok!(result), 42);
//!
//! let result: Result<i32, String> = Err("Invalid input: duplicate api key".to_string());
//! assert_contains_error!(result, "duplicate");
//! ```

/// Assert that a Result is Ok and extract the value.
///
/// If the Result is Err, panics with a message showing the error.
///
/// # Example
///
/// ```rust
/// use gapmap::assert_result_ok;
///
/// let result: Result<i32, &str> = Ok(42);
/// let value = assert_result_ok!(result);
/// assert_eq!(value, 42);
/// ```
#[macro_export]
macro_rules! assert_result_ok {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!(
                "Expected Ok, got Err: {:?}\n  at {}:{}:{}",
                e,
                file!(),
                line!(),
                column!()
            ),
        }
    };
    ($result:expr, $($msg:tt)+) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!(
                "{}: Expected Ok, got Err: {:?}\n  at {}:{}:{}",
                format!($($msg)+),
                e,
                file!(),
                line!(),
                column!()
            ),
        }
    };
}

/// Assert that a Result is Err and extract the error.
///
/// If the Result is Ok, panics with a message showing the value.
///
/// # Example
///
/// ```rust
/// use gapmap::assert_result_err;
///
/// let result: Result<i32, String> = Err("error".to_string());
/// let err = assert_result_err!(result);
/// assert_eq!(err, "error");
/// ```
#[macro_export]
macro_rules! assert_result_err {
    ($result:expr) => {
        match $result {
            Ok(value) => panic!(
                "Expected Err, got Ok: {:?}\n  at {}:{}:{}",
                value,
                file!(),
                line!(),
                column!()
            ),
            Err(e) => e,
        }
    };
    ($result:expr, $($msg:tt)+) => {
        match $result {
            Ok(value) => panic!(
                "{}: Expected Err, got Ok: {:?}\n  at {}:{}:{}",
                format!($($msg)+),
                value,
                file!(),
                line!(),
                column!()
            ),
            Err(e) => e,
        }
    };
}

/// Assert that an error message contains a specific pattern.
///
/// This macro first asserts the Result is Err, then checks if the
/// error's Display representation contains the pattern.
///
/// # Example
///
/// ```rust
/// use gapmap::assert_contains_error;
///
/// let result: Result<i32, String> = Err("Analysis run cancelled".to_string());
/// assert_contains_error!(result, "cancelled");
/// ```
#[macro_export]
macro_rules! assert_contains_error {
    ($result:expr, $pattern:expr) => {{
        let err = $crate::assert_result_err!($result);
        let err_str = err.to_string();
        assert!(
            err_str.contains($pattern),
            "Error '{}' does not contain '{}'\n  at {}:{}:{}",
            err_str,
            $pattern,
            file!(),
            line!(),
            column!()
        );
        err
    }};
}
