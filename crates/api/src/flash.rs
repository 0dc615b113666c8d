//! One-shot flash messages carried across a POST/redirect/GET cycle.
//!
//! The message rides in a short-lived `flash` cookie; the next rendered page
//! reads it and answers with a cookie that clears it.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
    response::{IntoResponse, Redirect, Response},
};

pub const COOKIE_NAME: &str = "flash";

const MAX_AGE_SECS: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Success,
    Error,
}

impl FlashKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error   => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: FlashKind::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: FlashKind::Error, message: message.into() }
    }

    /// Cookie value: `<kind>:<percent-encoded message>`.
    pub fn encode(&self) -> String {
        format!("{}:{}", self.kind.as_str(), urlencoding::encode(&self.message))
    }

    pub fn decode(value: &str) -> Option<Self> {
        let (kind, message) = value.split_once(':')?;
        let kind = match kind {
            "success" => FlashKind::Success,
            "error"   => FlashKind::Error,
            _ => return None,
        };
        let message = urlencoding::decode(message).ok()?.into_owned();
        Some(Self { kind, message })
    }

    fn set_cookie(&self) -> String {
        format!(
            "{COOKIE_NAME}={}; Path=/; Max-Age={MAX_AGE_SECS}; HttpOnly; SameSite=Lax",
            self.encode()
        )
    }
}

/// `Set-Cookie` value that removes a consumed flash.
pub fn clear_cookie() -> String {
    format!("{COOKIE_NAME}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax")
}

/// 303 redirect to `to` that leaves `flash` for the next page.
pub fn redirect(to: &str, flash: Flash) -> Response {
    ([(header::SET_COOKIE, flash.set_cookie())], Redirect::to(to)).into_response()
}

/// The flash sent with the current request, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncomingFlash(pub Option<Flash>);

impl IncomingFlash {
    pub fn message(&self) -> Option<&Flash> {
        self.0.as_ref()
    }

    /// Whether the response must clear the cookie.
    pub fn is_present(&self) -> bool {
        self.0.is_some()
    }
}

fn find_cookie<'a>(header_value: &'a str, name: &str) -> Option<&'a str> {
    header_value
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

impl<S: Send + Sync> FromRequestParts<S> for IncomingFlash {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let flash = parts
            .headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(|v| find_cookie(v, COOKIE_NAME))
            .and_then(Flash::decode);
        Ok(Self(flash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_message_survives_the_cookie() {
        let flash = Flash::success("Employee Ada Lovelace; has been added!");
        assert!(!flash.encode().contains(';'));
        assert_eq!(Flash::decode(&flash.encode()), Some(flash));
    }

    #[test]
    fn unknown_kind_is_ignored() {
        assert_eq!(Flash::decode("warning:hi"), None);
        assert_eq!(Flash::decode("no-separator"), None);
    }

    #[test]
    fn cookie_is_found_among_others() {
        let header = "theme=dark; flash=error:Not%20found; lang=en";
        assert_eq!(find_cookie(header, COOKIE_NAME), Some("error:Not%20found"));
        assert_eq!(find_cookie("theme=dark", COOKIE_NAME), None);
    }

    #[test]
    fn redirect_is_see_other_with_cookie() {
        let response = redirect("/employees", Flash::error("gone"));
        assert_eq!(response.status(), axum::http::StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/employees");
        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("flash=error:gone;"));
    }
}
