use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ResourceResponse {
    pub message: &'static str,
    pub authenticated: bool,
}
