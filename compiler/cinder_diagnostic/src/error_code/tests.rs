use super::*;

#[test]
fn test_error_code_display() {
    assert_eq!(ErrorCode::E1001.to_string(), "E1001");
    assert_eq!(ErrorCode::W2001.to_string(), "W2001");
}

#[test]
fn test_phase_from_first_digit() {
    assert_eq!(ErrorCode::E0002.phase(), Phase::Lexer);
    assert_eq!(ErrorCode::E1004.phase(), Phase::Parser);
    assert_eq!(ErrorCode::E2002.phase(), Phase::Type);
    assert_eq!(ErrorCode::W2003.phase(), Phase::Type);
    assert_eq!(ErrorCode::E3001.phase(), Phase::Include);
    assert_eq!(ErrorCode::E9001.phase(), Phase::Internal);
}

#[test]
fn test_warning_codes() {
    assert!(ErrorCode::W2002.is_warning());
    assert!(!ErrorCode::E2002.is_warning());
}
