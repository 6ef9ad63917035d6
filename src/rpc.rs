use axum::{
    extract::{FromRef, State},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::instrument;

use crate::{
    auth::{
        extractors::{require_user, Identity},
        jwt::JwtKeys,
        services as auth_services,
    },
    error::ApiError,
    posts::{
        dto::{DeletePostRequest, Pagination, UpdatePostRequest},
        services as post_services,
    },
    state::AppState,
};

/// Procedure-call envelope: a dotted procedure name plus its input payload.
#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    pub procedure: String,
    #[serde(default)]
    pub input: Value,
}

fn decode_input<T: DeserializeOwned>(input: Value) -> Result<T, ApiError> {
    serde_json::from_value(input).map_err(|e| ApiError::bad_request(format!("invalid input: {e}")))
}

fn decode_page(input: Value) -> Result<Pagination, ApiError> {
    if input.is_null() {
        return Ok(Pagination::default());
    }
    decode_input(input)
}

fn encode_result<T: Serialize>(value: T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::internal(e.to_string()))
}

/// Single dispatch point for the procedure surface. Open procedures run with
/// whatever identity was resolved; gated ones pass through `require_user`
/// first. Business logic is shared with the REST handlers.
#[instrument(skip(state, identity, req), fields(procedure = %req.procedure))]
pub async fn dispatch(
    State(state): State<AppState>,
    Identity(identity): Identity,
    Json(req): Json<RpcRequest>,
) -> Result<Json<Value>, ApiError> {
    let result = match req.procedure.as_str() {
        "auth.register" => {
            encode_result(auth_services::register(&state.db, decode_input(req.input)?).await?)?
        }
        "auth.login" => {
            let keys = JwtKeys::from_ref(&state);
            encode_result(auth_services::login(&state.db, &keys, decode_input(req.input)?).await?)?
        }
        "post.list" => encode_result(post_services::list(&state.db, decode_page(req.input)?).await?)?,
        "post.create" => {
            let user = require_user(identity)?;
            encode_result(post_services::create(&state.db, &user, decode_input(req.input)?).await?)?
        }
        "post.update" => {
            let user = require_user(identity)?;
            let input: UpdatePostRequest = decode_input(req.input)?;
            encode_result(post_services::update(&state.db, &user, input.id, input.content).await?)?
        }
        "post.delete" => {
            let user = require_user(identity)?;
            let input: DeletePostRequest = decode_input(req.input)?;
            encode_result(post_services::delete(&state.db, &user, input.id).await?)?
        }
        "post.userRelatedPosts" => {
            let user = require_user(identity)?;
            encode_result(post_services::user_related(&state.db, &user, decode_page(req.input)?).await?)?
        }
        other => return Err(ApiError::not_found(format!("unknown procedure: {other}"))),
    };
    Ok(Json(json!({ "result": result })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(procedure: &str, input: Value) -> RpcRequest {
        RpcRequest {
            procedure: procedure.into(),
            input,
        }
    }

    #[test]
    fn envelope_deserializes_with_and_without_input() {
        let req: RpcRequest =
            serde_json::from_str(r#"{"procedure":"post.list","input":{"page":2,"limit":5}}"#)
                .expect("deserialize");
        assert_eq!(req.procedure, "post.list");
        assert_eq!(req.input["page"], 2);

        let bare: RpcRequest =
            serde_json::from_str(r#"{"procedure":"post.list"}"#).expect("deserialize");
        assert!(bare.input.is_null());
    }

    #[test]
    fn null_input_falls_back_to_default_pagination() {
        let page = decode_page(Value::Null).expect("default");
        assert_eq!(page.page, 1);
    }

    #[test]
    fn malformed_input_is_a_bad_request() {
        let err = decode_input::<UpdatePostRequest>(json!({"id": "not-a-uuid"})).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn unknown_procedure_is_not_found() {
        let state = AppState::fake();
        let err = dispatch(
            State(state),
            Identity(None),
            Json(call("post.explode", Value::Null)),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn gated_procedures_reject_anonymous_callers_before_any_work() {
        let state = AppState::fake();
        for procedure in ["post.create", "post.update", "post.delete", "post.userRelatedPosts"] {
            let err = dispatch(
                State(state.clone()),
                Identity(None),
                Json(call(procedure, Value::Null)),
            )
            .await
            .unwrap_err();
            assert!(
                matches!(err, ApiError::Unauthorized(_)),
                "{procedure} let an anonymous caller through"
            );
        }
    }
}
