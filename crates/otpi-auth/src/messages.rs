//! User-facing message text.
//!
//! The service and its users are Korean-speaking; every banner shown by the
//! controller is defined here.

/// Severity of a banner message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Something failed
    Error,
    /// An action completed
    Success,
    /// Neutral status
    Info,
    /// Degraded but non-fatal
    Warning,
}

/// Empty email field.
pub const EMAIL_REQUIRED: &str = "이메일을 입력해 주세요.";
/// Empty email or code field.
pub const EMAIL_AND_CODE_REQUIRED: &str = "이메일과 OTP 코드를 모두 입력해 주세요.";
/// Fallback when the service gives no detail.
pub const UNKNOWN_ERROR: &str = "알 수 없는 오류";
/// Fallback confirmation for a code request.
pub const OTP_SENT: &str = "OTP가 이메일로 발송되었습니다.";
/// Fallback for `login: false` without a server message.
pub const INVALID_CODE: &str = "OTP 인증 코드가 올바르지 않습니다.";
/// Network or parse failure.
pub const TRANSPORT_ERROR: &str =
    "서버 통신 오류가 발생했습니다. 백엔드 서버 상태를 확인해 주세요.";
/// Network failure while logging out.
pub const LOGOUT_TRANSPORT_ERROR: &str =
    "서버 통신 오류가 발생했습니다. 로그인 폼으로 돌아갑니다.";
/// Logout acknowledged by the service.
pub const LOGGED_OUT: &str = "로그아웃 되었습니다.";
/// Logout answered with a non-2xx status.
pub const LOGGED_OUT_UNCONFIRMED: &str = "로그아웃 되었습니다. (서버 통신 문제 가능성)";
/// Session check failed at startup.
pub const BOOTSTRAP_FAILED: &str = "초기 로그인 상태 확인 중 서버 통신 오류가 발생했습니다.";
/// Resend attempted while the code is still valid.
pub const RESEND_UNAVAILABLE: &str = "재전송은 유효 시간이 만료된 후에 가능합니다.";
/// Tab switch attempted while signed in.
pub const ALREADY_SIGNED_IN: &str = "이미 로그인되어 있습니다. 먼저 로그아웃해 주세요.";
/// Substring the service uses for a duplicate registration.
pub const DUPLICATE_EMAIL_MARKER: &str = "이미 등록된 이메일입니다.";
/// Rewritten duplicate registration notice.
pub const DUPLICATE_EMAIL_NOTICE: &str = "이미 등록된 이메일입니다. 로그인 탭을 이용해 주세요.";
/// Countdown label once the code has expired.
pub const CODE_EXPIRED: &str = "유효 시간 만료!";

/// `"OTP 요청 실패: {detail}"`.
#[must_use]
pub fn request_failed(detail: Option<&str>) -> String {
    format!("OTP 요청 실패: {}", detail.unwrap_or(UNKNOWN_ERROR))
}

/// `"인증 오류: {detail}"`.
#[must_use]
pub fn verify_failed(detail: Option<&str>) -> String {
    format!("인증 오류: {}", detail.unwrap_or(UNKNOWN_ERROR))
}

/// `"{name}님, 로그인 성공!"`.
#[must_use]
pub fn login_succeeded(name: &str) -> String {
    format!("{name}님, 로그인 성공!")
}

/// Success banner after registration.
#[must_use]
pub fn registered(who: &str) -> String {
    format!("{who}님, 성공적으로 등록되었습니다. 로그인 탭으로 이동하세요.")
}

/// `"등록 오류: {detail}"`, rewriting the duplicate-email case.
#[must_use]
pub fn register_failed(status: Option<u16>, detail: Option<&str>) -> String {
    let detail = detail.unwrap_or(UNKNOWN_ERROR);
    let detail = if status == Some(400) && detail.contains(DUPLICATE_EMAIL_MARKER) {
        DUPLICATE_EMAIL_NOTICE
    } else {
        detail
    };
    format!("등록 오류: {detail}")
}

/// `"유효 시간: MM:SS"`.
#[must_use]
pub fn countdown_label(mm_ss: &str) -> String {
    format!("유효 시간: {mm_ss}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_failed_fallback() {
        assert_eq!(request_failed(Some("차단됨")), "OTP 요청 실패: 차단됨");
        assert_eq!(request_failed(None), "OTP 요청 실패: 알 수 없는 오류");
    }

    #[test]
    fn test_register_failed_rewrites_duplicate() {
        let message = register_failed(Some(400), Some("이미 등록된 이메일입니다."));
        assert_eq!(
            message,
            "등록 오류: 이미 등록된 이메일입니다. 로그인 탭을 이용해 주세요."
        );
    }

    #[test]
    fn test_register_failed_keeps_other_details() {
        assert_eq!(
            register_failed(Some(400), Some("이름이 너무 깁니다.")),
            "등록 오류: 이름이 너무 깁니다."
        );
        // Only a 400 is rewritten
        assert_eq!(
            register_failed(Some(409), Some("이미 등록된 이메일입니다.")),
            "등록 오류: 이미 등록된 이메일입니다."
        );
        assert_eq!(register_failed(None, None), "등록 오류: 알 수 없는 오류");
    }

    #[test]
    fn test_login_and_register_banners() {
        assert_eq!(login_succeeded("Kim"), "Kim님, 로그인 성공!");
        assert!(registered("Lee").starts_with("Lee님, 성공적으로 등록되었습니다."));
        assert_eq!(countdown_label("01:20"), "유효 시간: 01:20");
    }
}
