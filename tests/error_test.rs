//! Tests for error types

use model_arena::{Error, TaskType};

#[test]
fn test_invalid_input_error() {
    let error = Error::InvalidInput("no algorithms submitted".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Invalid input"));
    assert!(error_str.contains("no algorithms submitted"));
}

#[test]
fn test_contract_violation_error() {
    let error = Error::ContractViolation {
        expected: TaskType::Regression,
        found: TaskType::Classification,
        algorithm: "knn".to_string(),
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("Task type contract violated"));
    assert!(error_str.contains("'knn' is Classification"));
    assert!(error_str.contains("single task type"));
}

#[test]
fn test_persistence_error() {
    let error = Error::Persistence("connection refused".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Persistence error"));
    assert!(error_str.contains("connection refused"));
}

#[test]
fn test_notification_error() {
    let error = Error::Notification("topic not found".to_string());
    assert!(format!("{error}").starts_with("Notification error"));
}

#[test]
fn test_io_error_conversion() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "trainer not found");
    let error: Error = io_error.into();
    let error_str = format!("{error}");
    assert!(error_str.contains("IO error"));
    assert!(!error.is_rejection());
}

#[test]
fn test_json_error_conversion() {
    let json_error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let error: Error = json_error.into();
    assert!(format!("{error}").contains("JSON error"));
}

#[test]
fn test_other_error() {
    let error = Error::Other("custom error message".to_string());
    let error_str = format!("{error}");
    assert_eq!(error_str, "custom error message");
}

#[test]
fn test_error_debug() {
    let error = Error::Config("max_workers must be positive".to_string());
    let debug_str = format!("{error:?}");
    assert!(debug_str.contains("Config"));
}

#[test]
fn test_result_type_alias_error() {
    fn returns_error() -> model_arena::Result<i32> {
        Err(Error::Other("test error".to_string()))
    }

    let result = returns_error();
    assert!(result.is_err());
}
