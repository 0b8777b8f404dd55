use axum::extract::FromRequest;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// `axum::Json` whose rejections render through `AppError`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Parse a client-supplied record id.
pub fn parse_id(raw: &str, what: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::validation(format!("Invalid {} format", what)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_accepts_uuid() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&format!(" {} ", id), "scan ID").unwrap(), id);
    }

    #[test]
    fn parse_id_rejects_garbage() {
        let err = parse_id("64f1c0ffee", "scan ID").unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "Invalid scan ID format"));
    }
}
