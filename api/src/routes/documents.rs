//! Document CRUD handlers.
//!
//! Reads and writes pass straight through to the [`DocumentStore`]. After a
//! successful write the stored document is broadcast to realtime
//! subscribers: creations to subscribers of the owning project, updates to
//! subscribers of the document itself.
//!
//! [`DocumentStore`]: crate::store::DocumentStore

use axum::extract::{Path, Query, State};
use axum::Json;
use tracing::{debug, error, info};

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::models::{Document, DocumentCreate, DocumentPatch, DocumentUpdate, ListQuery, NewDocument};
use crate::state::AppState;
use crate::ws::{DocumentId, ServerMessage};

/// `GET /api/documents`
pub async fn list_documents(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Document>>, ApiError> {
    debug!(user_id = %user.id(), skip = query.skip, limit = query.effective_limit(), "Listing documents");

    let documents = state.store.list(&query).await.map_err(|e| {
        error!(error = %e, "Error fetching documents");
        ApiError::internal("Failed to fetch documents")
    })?;
    Ok(Json(documents))
}

/// `POST /api/documents`
pub async fn create_document(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<DocumentCreate>,
) -> Result<Json<Document>, ApiError> {
    let document = state
        .store
        .create(NewDocument::from_request(request, user.id()))
        .await
        .map_err(|e| {
            error!(error = %e, "Error creating document");
            ApiError::internal("Failed to create document")
        })?;

    info!(doc_id = %document.id, project_id = %document.project_id, "Document created");

    let event = ServerMessage::document_created(document.clone());
    state
        .ws
        .broadcaster
        .broadcast(&DocumentId::new(document.project_id.clone()), &event)
        .await;

    Ok(Json(document))
}

/// `PUT /api/documents/{document_id}`
pub async fn update_document(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(document_id): Path<String>,
    Json(request): Json<DocumentUpdate>,
) -> Result<Json<Document>, ApiError> {
    let document = state
        .store
        .update(&document_id, DocumentPatch::from(request))
        .await
        .map_err(|e| {
            error!(error = %e, doc_id = %document_id, "Error updating document");
            ApiError::internal("Failed to update document")
        })?
        .ok_or_else(|| ApiError::not_found("Document not found"))?;

    info!(doc_id = %document.id, user_id = %user.id(), "Document updated");

    let event = ServerMessage::document_updated(document.clone(), user.id());
    state
        .ws
        .broadcaster
        .broadcast(&DocumentId::new(document_id), &event)
        .await;

    Ok(Json(document))
}
