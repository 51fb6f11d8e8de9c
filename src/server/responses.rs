use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, Clone)]
pub struct UnknownAuthor {
    pub name: String,
}

impl IntoResponse for UnknownAuthor {
    fn into_response(self) -> Response {
        let name = self.name;

        IntoResponse::into_response((
            StatusCode::NOT_FOUND,
            format!("The feed has no articles by `{name}`"),
        ))
    }
}
