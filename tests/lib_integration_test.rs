//! Integration tests for the library public API

use grid_policy_net::{PolicyNetError, Result, DESCRIPTION, NAME, VERSION};

#[test]
fn test_library_metadata() {
    assert!(!VERSION.is_empty());
    assert_eq!(NAME, "grid_policy_net");
    assert!(!DESCRIPTION.is_empty());
}

#[test]
fn test_error_types() {
    let config_error = PolicyNetError::Config("bad filters".to_string());
    assert!(matches!(config_error, PolicyNetError::Config(_)));
    assert_eq!(config_error.to_string(), "Invalid configuration: bad filters");

    let shape_error = PolicyNetError::ShapeMismatch {
        expected: vec![-1, 3, 3, 2],
        found: vec![1, 6, 7, 2],
    };
    assert_eq!(
        shape_error.to_string(),
        "Shape mismatch: expected [-1, 3, 3, 2], found [1, 6, 7, 2]"
    );

    let io_error: PolicyNetError = std::io::Error::other("disk").into();
    assert!(matches!(io_error, PolicyNetError::Io(_)));
}

#[test]
fn test_result_type_alias() {
    let success: Result<i32> = Ok(42);
    assert!(success.is_ok());

    let failure: Result<i32> = Err(PolicyNetError::Dataset("test".to_string()));
    assert!(failure.is_err());
}
