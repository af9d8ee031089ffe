use loginport_domain::DomainError;
use reqwest::{Response, StatusCode};

const BODY_SNIPPET_LEN: usize = 300;

/// Map a non-success Google API response to a domain error.
pub(crate) async fn ensure_success(response: Response, context: &str) -> Result<Response, DomainError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, context, &body))
}

pub(crate) fn status_error(status: StatusCode, context: &str, body: &str) -> DomainError {
    let detail: String = body.chars().take(BODY_SNIPPET_LEN).collect();
    match status {
        StatusCode::FORBIDDEN => DomainError::Permission(format!(
            "{}: the caller does not have permission. Share the spreadsheet with the service account ({})",
            context, detail
        )),
        StatusCode::NOT_FOUND => DomainError::NotFound(format!("{}: {}", context, detail)),
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
            DomainError::Validation(format!("{} rejected ({}): {}", context, status, detail))
        }
        _ => DomainError::Infrastructure(format!("{} failed ({}): {}", context, status, detail)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, "read", ""),
            DomainError::Permission(_)
        ));
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, "read", ""),
            DomainError::NotFound(_)
        ));
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, "read", ""),
            DomainError::Validation(_)
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_GATEWAY, "read", ""),
            DomainError::Infrastructure(_)
        ));
    }

    #[test]
    fn test_body_is_truncated() {
        let body = "x".repeat(1000);
        let err = status_error(StatusCode::INTERNAL_SERVER_ERROR, "read", &body);
        assert!(err.message().len() < 400);
    }
}
