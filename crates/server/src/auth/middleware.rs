use crate::config::AppState;
use crate::ctx::Ctx;
use crate::error::{Error, Result};
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::debug;

pub async fn mw_require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    debug!("MIDDLEWARE: require_auth");

    let auth_header = req.headers().get(header::AUTHORIZATION);
    let auth_header = match auth_header {
        Some(h) => h.to_str().map_err(|_| Error::AuthFailTokenWrongFormat)?,
        None => return Err(Error::AuthFailNoToken),
    };

    // Format: "Bearer <token>"
    if !auth_header.starts_with("Bearer ") {
        return Err(Error::AuthFailTokenWrongFormat);
    }

    let token = &auth_header[7..];

    let claims = state.auth.verify_token(token)?;

    // Stamp the verified identity onto the request
    let ctx = Ctx::new(claims.sub, claims.username);
    req.extensions_mut().insert(ctx);

    Ok(next.run(req).await)
}
