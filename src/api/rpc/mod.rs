//! JSON remote-procedure surface.
//!
//! `POST /api/rpc` takes `{"operation": "...", "params": ...}` and
//! `POST /api/rpc/{operation}` takes the params as the whole body. Both run
//! the same services as the REST routes, with the same bearer authentication
//! and ownership checks, and differ only in envelope:
//! `{"success": bool, "message": "...", ...}`.

pub mod params;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::str::FromStr;
use std::sync::Arc;

use super::{ApiError, AppState, auth::authenticate};
use crate::domain::{AddressId, AddressLocator, ContactId, Principal, UserId};
use crate::models::{AddressPatch, ContactPatch, Credentials, NewAddress, NewContact, NewUser};

/// Operations callable without a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicOperation {
    CreateUser,
    Login,
}

/// Operations that require a bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthenticatedOperation {
    Logout,
    GetUser,
    CreateContact,
    GetContact,
    UpdateContact,
    DeleteContact,
    GetAllContacts,
    CreateAddress,
    GetAddress,
    UpdateAddress,
    DeleteAddress,
    GetContactAddresses,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Public(PublicOperation),
    Authenticated(AuthenticatedOperation),
}

impl FromStr for Operation {
    type Err = ApiError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        use AuthenticatedOperation as A;
        use PublicOperation as P;

        let op = match name {
            "createUser" => Self::Public(P::CreateUser),
            "login" => Self::Public(P::Login),
            "logout" => Self::Authenticated(A::Logout),
            "getUser" => Self::Authenticated(A::GetUser),
            "createContact" => Self::Authenticated(A::CreateContact),
            "getContact" => Self::Authenticated(A::GetContact),
            "updateContact" => Self::Authenticated(A::UpdateContact),
            "deleteContact" => Self::Authenticated(A::DeleteContact),
            "getAllContacts" => Self::Authenticated(A::GetAllContacts),
            "createAddress" => Self::Authenticated(A::CreateAddress),
            "getAddress" => Self::Authenticated(A::GetAddress),
            "updateAddress" => Self::Authenticated(A::UpdateAddress),
            "deleteAddress" => Self::Authenticated(A::DeleteAddress),
            "getContactAddresses" => Self::Authenticated(A::GetContactAddresses),
            other => return Err(ApiError::NotFound(format!("Unknown operation: {other}"))),
        };
        Ok(op)
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    operation: String,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, Serialize)]
struct Failure {
    success: bool,
    message: String,
}

/// RPC rendering of an [`ApiError`]: same status, flat body.
struct RpcFailure(ApiError);

impl IntoResponse for RpcFailure {
    fn into_response(self) -> Response {
        let (status, message) = self.0.into_parts();
        let body = Failure {
            success: false,
            message,
        };
        (status, Json(body)).into_response()
    }
}

type RpcResult = Result<(StatusCode, Value), ApiError>;

/// `POST /api/rpc`
pub async fn handle(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match serde_json::from_slice::<Envelope>(&body) {
        Ok(envelope) => dispatch(&state, &headers, &envelope.operation, envelope.params).await,
        Err(e) => RpcFailure(ApiError::validation(format!("Invalid RPC request: {e}")))
            .into_response(),
    }
}

/// `POST /api/rpc/{operation}`
pub async fn handle_named(
    State(state): State<Arc<AppState>>,
    Path(operation): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let params = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        match serde_json::from_slice(&body) {
            Ok(params) => params,
            Err(e) => {
                return RpcFailure(ApiError::validation(format!("Invalid RPC request: {e}")))
                    .into_response();
            }
        }
    };

    dispatch(&state, &headers, &operation, params).await
}

async fn dispatch(state: &AppState, headers: &HeaderMap, operation: &str, params: Value) -> Response {
    let result = match operation.parse::<Operation>() {
        Ok(Operation::Public(op)) => execute_public(state, op, params).await,
        Ok(Operation::Authenticated(op)) => {
            let header = headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok());
            match authenticate(state, header).await {
                Ok(principal) => execute(state, &principal, op, params).await,
                Err(e) => Err(e),
            }
        }
        Err(e) => Err(e),
    };

    tracing::debug!(operation, ok = result.is_ok(), "RPC call");

    match result {
        Ok((status, body)) => (status, Json(body)).into_response(),
        Err(e) => RpcFailure(e).into_response(),
    }
}

fn ack(message: &str) -> Value {
    json!({ "success": true, "message": message })
}

fn ack_with(message: &str, key: &str, value: Value) -> Value {
    let mut body = ack(message);
    body[key] = value;
    body
}

/// Serializes `dto` and adds the parent key the public DTO leaves out.
fn with_parent<T: Serialize>(dto: &T, key: &str, parent: i32) -> Result<Value, ApiError> {
    let mut value = serde_json::to_value(dto).map_err(|e| ApiError::internal(e.to_string()))?;
    value[key] = json!(parent);
    Ok(value)
}

async fn execute_public(state: &AppState, op: PublicOperation, params: Value) -> RpcResult {
    match op {
        PublicOperation::CreateUser => {
            let input: NewUser =
                params::payload(params::unwrap_entity(params, "user"), "user")
                    .map_err(ApiError::validation)?;
            let user = state.auth_service().register(input).await?;
            Ok((
                StatusCode::CREATED,
                ack_with("User created successfully", "user_id", json!(user.id)),
            ))
        }
        PublicOperation::Login => {
            let credentials: Credentials =
                params::payload(params::unwrap_entity(params, "user"), "credentials")
                    .map_err(ApiError::validation)?;
            let login = state.auth_service().login(credentials).await?;

            let mut body = ack("Login successful");
            body["user_id"] = json!(login.user.id);
            body["username"] = json!(login.user.username);
            body["name"] = json!(login.user.name);
            body["token"] = json!(login.token);
            Ok((StatusCode::OK, body))
        }
    }
}

#[allow(clippy::too_many_lines)]
async fn execute(
    state: &AppState,
    principal: &Principal,
    op: AuthenticatedOperation,
    params: Value,
) -> RpcResult {
    use AuthenticatedOperation as Op;

    let contacts = state.contact_service();
    let addresses = state.address_service();

    match op {
        Op::Logout => {
            state.auth_service().logout(principal).await?;
            Ok((StatusCode::OK, ack("Logout successful")))
        }
        Op::GetUser => {
            let params = params::unwrap_entity(params, "user");
            let id = params::require_id(&params, "id").map_err(ApiError::validation)?;
            let user = state
                .auth_service()
                .get_user(principal, UserId::new(id))
                .await?;
            Ok((StatusCode::OK, json!(user)))
        }
        Op::CreateContact => {
            let input: NewContact =
                params::payload(params::unwrap_entity(params, "contact"), "contact")
                    .map_err(ApiError::validation)?;
            let contact = contacts.create_contact(principal, input).await?;
            Ok((
                StatusCode::CREATED,
                ack_with("Contact created successfully", "contact_id", json!(contact.id)),
            ))
        }
        Op::GetContact => {
            let params = params::unwrap_entity(params, "contact");
            let id = params::require_id(&params, "id").map_err(ApiError::validation)?;
            let contact = contacts.get_contact(principal, ContactId::new(id)).await?;
            let body = with_parent(&contact, "user_id", contact.user_id.value())?;
            Ok((StatusCode::OK, body))
        }
        Op::UpdateContact => {
            let params = params::unwrap_entity(params, "contact");
            let id = params::require_id(&params, "id").map_err(ApiError::validation)?;
            let patch: ContactPatch =
                params::payload(params, "contact").map_err(ApiError::validation)?;
            contacts
                .update_contact(principal, ContactId::new(id), patch)
                .await?;
            Ok((StatusCode::OK, ack("Contact updated successfully")))
        }
        Op::DeleteContact => {
            let params = params::unwrap_entity(params, "contact");
            let id = params::require_id(&params, "id").map_err(ApiError::validation)?;
            contacts.delete_contact(principal, ContactId::new(id)).await?;
            Ok((StatusCode::OK, ack("Contact deleted successfully")))
        }
        Op::GetAllContacts => {
            let list = contacts.list_contacts(principal).await?;
            let items = list
                .iter()
                .map(|c| with_parent(c, "user_id", c.user_id.value()))
                .collect::<Result<Vec<_>, _>>()?;
            Ok((StatusCode::OK, json!({ "contact": items })))
        }
        Op::CreateAddress => {
            let params = params::unwrap_entity(params, "address");
            let contact_id =
                params::require_id(&params, "contact_id").map_err(ApiError::validation)?;
            let input: NewAddress =
                params::payload(params, "address").map_err(ApiError::validation)?;
            let address = addresses
                .create_address(principal, ContactId::new(contact_id), input)
                .await?;
            Ok((
                StatusCode::CREATED,
                ack_with("Address created successfully", "address_id", json!(address.id)),
            ))
        }
        Op::GetAddress => {
            let params = params::unwrap_entity(params, "address");
            let locator = address_locator(&params)?;
            let address = addresses.get_address(principal, locator).await?;
            let body = with_parent(&address, "contact_id", address.contact_id.value())?;
            Ok((StatusCode::OK, body))
        }
        Op::UpdateAddress => {
            let params = params::unwrap_entity(params, "address");
            let locator = address_locator(&params)?;
            let patch: AddressPatch =
                params::payload(params, "address").map_err(ApiError::validation)?;
            addresses.update_address(principal, locator, patch).await?;
            Ok((StatusCode::OK, ack("Address updated successfully")))
        }
        Op::DeleteAddress => {
            let params = params::unwrap_entity(params, "address");
            let locator = address_locator(&params)?;
            addresses.delete_address(principal, locator).await?;
            Ok((StatusCode::OK, ack("Address deleted successfully")))
        }
        Op::GetContactAddresses => {
            let params = params::unwrap_entity(params, "contact");
            let contact_id =
                params::require_id(&params, "contact_id").map_err(ApiError::validation)?;
            let list = addresses
                .list_addresses(principal, ContactId::new(contact_id))
                .await?;
            let items = list
                .iter()
                .map(|a| with_parent(a, "contact_id", a.contact_id.value()))
                .collect::<Result<Vec<_>, _>>()?;
            Ok((StatusCode::OK, json!({ "address": items })))
        }
    }
}

/// An address id alone resolves its parent; with `contact_id` present the
/// nested check applies, as on the REST routes.
fn address_locator(params: &Value) -> Result<AddressLocator, ApiError> {
    let address_id = params::require_id(params, "id").map_err(ApiError::validation)?;
    let address_id = AddressId::new(address_id);

    let contact_id = match params {
        Value::Object(map) => match map.get("contact_id") {
            None | Some(Value::Null) => None,
            Some(raw) => {
                Some(params::require_id(raw, "contact_id").map_err(ApiError::validation)?)
            }
        },
        _ => None,
    };

    Ok(contact_id.map_or(AddressLocator::Bare(address_id), |contact_id| {
        AddressLocator::nested(ContactId::new(contact_id), address_id)
    }))
}
