use thiserror::Error;

pub type Result<T> = std::result::Result<T, ParseError>;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unsupported authorization scheme")]
    UnsupportedScheme,
    #[error("empty bearer token")]
    EmptyToken,
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn parse_bearer_header(auth_header: &str) -> Result<&str> {
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(ParseError::UnsupportedScheme)?
        .trim();

    if token.is_empty() {
        return Err(ParseError::EmptyToken);
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::parse_bearer_header;

    #[test]
    fn accepts_bearer_tokens() {
        assert_eq!(parse_bearer_header("Bearer abc.def.ghi").unwrap(), "abc.def.ghi");
    }

    #[test]
    fn rejects_other_schemes() {
        assert!(parse_bearer_header("Basic dXNlcjpwYXNz").is_err());
        assert!(parse_bearer_header("Bearer ").is_err());
    }
}
