// Unit Tests for OvpError
//
// UNIT UNDER TEST: OvpError (categorization and constructors)
//
// BUSINESS RESPONSIBILITY:
//   - Separates service outcomes from harness defects so a hung or abandoned
//     callback chain is never mistaken for an API error
//   - Classifies service exception codes (not-found, session rejections)
//   - Provides a stable category/severity for each failure mode
//
// TEST COVERAGE:
//   - Exception code classification in OvpError::api
//   - Category and severity mapping
//   - Display formatting for error reporting

use crate::error::{ErrorCategory, ErrorSeverity, OvpError};
use std::time::Duration;

#[cfg(test)]
mod api_classification_tests {
    use super::*;

    #[test]
    fn test_not_found_codes_become_not_found_errors() {
        // Fetching a deleted object must surface as a not-found error so a
        // lifecycle test can tell it apart from any other failure

        // Act
        let err = OvpError::api("UICONF_ID_NOT_FOUND", "Ui conf id [7] not found");

        // Assert
        assert!(err.is_not_found(), "Code ending in _NOT_FOUND is not-found");
        match err {
            OvpError::NotFound { code, message } => {
                assert_eq!(code, "UICONF_ID_NOT_FOUND");
                assert!(message.contains("[7]"));
            }
            other => panic!("Expected NotFound, got: {other:?}"),
        }
    }

    #[test]
    fn test_session_rejection_codes_become_authentication_failures() {
        for code in ["INVALID_KS", "EXPIRED_KS", "MISSING_KS", "START_SESSION_ERROR"] {
            let err = OvpError::api(code, "rejected");
            assert!(
                matches!(err, OvpError::AuthenticationFailed { .. }),
                "{code} should map to AuthenticationFailed, got {err:?}"
            );
        }
    }

    #[test]
    fn test_other_codes_stay_api_exceptions() {
        let err = OvpError::api("PROPERTY_VALIDATION_MIN_LENGTH", "name too short");

        assert!(!err.is_not_found());
        assert!(matches!(err, OvpError::Api { .. }));
        assert_eq!(err.category(), ErrorCategory::External);
    }
}

#[cfg(test)]
mod categorization_tests {
    use super::*;

    #[test]
    fn test_gate_defects_are_internal_and_critical() {
        // A gate that times out or is abandoned means the harness lost track
        // of a callback; these must never look like ordinary API errors

        let timeout = OvpError::gate_timeout("case::add", 250);
        let abandoned = OvpError::gate_abandoned("case::add");

        assert_eq!(timeout.category(), ErrorCategory::Internal);
        assert_eq!(timeout.severity(), ErrorSeverity::Critical);
        assert!(timeout.is_harness_defect());
        assert_eq!(abandoned.category(), ErrorCategory::Internal);
        assert!(abandoned.is_harness_defect());
    }

    #[test]
    fn test_not_found_is_expected_business_outcome() {
        let err = OvpError::not_found("UICONF_ID_NOT_FOUND", "gone");

        assert_eq!(err.category(), ErrorCategory::BusinessLogic);
        assert_eq!(err.severity(), ErrorSeverity::Info);
        assert!(!err.is_harness_defect());
    }

    #[test]
    fn test_client_side_errors_are_client_category() {
        assert_eq!(
            OvpError::configuration_error("missing").category(),
            ErrorCategory::Client
        );
        assert_eq!(
            OvpError::session_required("uiconf", "get").category(),
            ErrorCategory::Client
        );
        assert_eq!(OvpError::timeout(Duration::from_secs(5)).category(), ErrorCategory::Transient);
    }

    #[test]
    fn test_display_includes_context() {
        let err = OvpError::scenario_failed("fetched", "delete of 9 failed");
        assert_eq!(
            err.to_string(),
            "Scenario failed after reaching fetched: delete of 9 failed"
        );

        let err = OvpError::session_required("uiconf", "add");
        assert_eq!(err.to_string(), "No active session for uiconf.add");
    }

    #[test]
    fn test_sub_second_timeouts_keep_their_bound() {
        let err = OvpError::timeout(Duration::from_millis(250));
        assert_eq!(err.to_string(), "Request timed out after 250ms");

        let err = OvpError::flush_timeout(2, Duration::from_millis(100));
        assert_eq!(
            err.to_string(),
            "Executor flush timed out after 100ms with 2 in flight"
        );
        assert_eq!(err.category(), ErrorCategory::Transient);
        assert!(!err.is_harness_defect());
    }
}
