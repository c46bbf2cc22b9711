//! Encounter table API routes

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::application::dto::{
    CreateEncounterTableRequestDto, EncounterTableResponseDto, NameSuggestionResponseDto,
    PaginatedTablesResponseDto, PaginationQuery, PreviewResponseDto, RollResponseDto,
    ShareTableRequestDto, ShareTableResponseDto, UpdateEncounterTableRequestDto,
};
use crate::domain::value_objects::TableId;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::extractors::{CurrentUser, ValidatedJson};
use crate::infrastructure::state::AppState;

fn parse_table_id(id: &str) -> Result<TableId, ApiError> {
    TableId::parse(id).map_err(|_| ApiError::bad_request("Invalid table ID format"))
}

/// Generate entries for a would-be table without saving it
pub async fn preview_table(
    State(state): State<Arc<AppState>>,
    caller: Option<CurrentUser>,
    ValidatedJson(req): ValidatedJson<CreateEncounterTableRequestDto>,
) -> Result<Json<PreviewResponseDto>, ApiError> {
    let caller = caller.map(|CurrentUser(c)| c);
    let preview = state
        .encounter_tables
        .preview(req.into(), caller.as_ref())
        .await?;

    Ok(Json(PreviewResponseDto::from(preview)))
}

pub async fn suggest_name(State(state): State<Arc<AppState>>) -> Json<NameSuggestionResponseDto> {
    Json(NameSuggestionResponseDto {
        name: state.encounter_tables.suggest_name(),
    })
}

/// List the caller's tables
pub async fn list_tables(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    query: Result<Query<PaginationQuery>, QueryRejection>,
) -> Result<Json<PaginatedTablesResponseDto>, ApiError> {
    let Query(query) = query?;
    let page = state
        .encounter_tables
        .list_tables(&caller, query.page, query.limit)
        .await?;

    Ok(Json(PaginatedTablesResponseDto::from(page)))
}

pub async fn create_table(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    ValidatedJson(req): ValidatedJson<CreateEncounterTableRequestDto>,
) -> Result<(StatusCode, Json<EncounterTableResponseDto>), ApiError> {
    let created = state
        .encounter_tables
        .create_table(&caller, req.into())
        .await?;

    Ok((StatusCode::CREATED, Json(EncounterTableResponseDto::from(created))))
}

/// Get a table with its entries
pub async fn get_table(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    caller: Option<CurrentUser>,
) -> Result<Json<EncounterTableResponseDto>, ApiError> {
    let id = parse_table_id(&id)?;
    let caller = caller.map(|CurrentUser(c)| c);
    let loaded = state.encounter_tables.get_table(id, caller.as_ref()).await?;

    Ok(Json(EncounterTableResponseDto::from(loaded)))
}

pub async fn update_table(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    CurrentUser(caller): CurrentUser,
    ValidatedJson(req): ValidatedJson<UpdateEncounterTableRequestDto>,
) -> Result<Json<EncounterTableResponseDto>, ApiError> {
    let id = parse_table_id(&id)?;
    let table = state
        .encounter_tables
        .update_table(&caller, id, req.into())
        .await?;

    Ok(Json(EncounterTableResponseDto::from(table)))
}

pub async fn delete_table(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    CurrentUser(caller): CurrentUser,
) -> Result<StatusCode, ApiError> {
    let id = parse_table_id(&id)?;
    state.encounter_tables.delete_table(&caller, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Replace every entry with a fresh roll of the stored filters
pub async fn regenerate_entries(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    CurrentUser(caller): CurrentUser,
) -> Result<Json<EncounterTableResponseDto>, ApiError> {
    let id = parse_table_id(&id)?;
    let loaded = state
        .encounter_tables
        .regenerate_entries(&caller, id)
        .await?;

    Ok(Json(EncounterTableResponseDto::from(loaded)))
}

pub async fn roll_table(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    caller: Option<CurrentUser>,
) -> Result<Json<RollResponseDto>, ApiError> {
    let id = parse_table_id(&id)?;
    let caller = caller.map(|CurrentUser(c)| c);
    let outcome = state.rolls.roll_table(id, caller.as_ref()).await?;

    Ok(Json(RollResponseDto::from(outcome)))
}

/// Publish or unpublish a table
pub async fn share_table(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    CurrentUser(caller): CurrentUser,
    ValidatedJson(req): ValidatedJson<ShareTableRequestDto>,
) -> Result<Json<ShareTableResponseDto>, ApiError> {
    let id = parse_table_id(&id)?;
    let change = state
        .encounter_tables
        .set_visibility(&caller, id, req.is_public)
        .await?;

    Ok(Json(ShareTableResponseDto::from(change)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    use crate::domain::value_objects::UserId;
    use crate::infrastructure::http::test_support::{send, TestApp};

    fn create_body(name: &str) -> Value {
        json!({
            "name": name,
            "die_size": 6,
            "filters": { "locations": ["crypt"] }
        })
    }

    async fn create(app: &TestApp, owner: UserId, body: Value) -> Value {
        let (status, created) = send(app, "POST", "/api/encounter-tables", Some(owner), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "{created}");
        created
    }

    #[tokio::test]
    async fn test_preview_anonymous() {
        let app = TestApp::new().await;
        let (status, body) = send(
            &app,
            "POST",
            "/api/encounter-tables/preview",
            None,
            Some(json!({ "name": "Crypt Crawl", "die_size": 8 })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let entries = body["preview"]["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 8);
        assert_eq!(body["preview"]["die_size"], 8);
        assert_eq!(entries[0]["roll_min"], 1);
    }

    #[tokio::test]
    async fn test_preview_schema_failure_has_details() {
        let app = TestApp::new().await;
        let (status, body) = send(
            &app,
            "POST",
            "/api/encounter-tables/preview",
            None,
            Some(json!({ "name": "Crypt Crawl", "die_size": 1 })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Validation error");
        assert!(body["details"]["die_size"].is_array());
    }

    #[tokio::test]
    async fn test_preview_without_matches() {
        let app = TestApp::new().await;
        let (status, body) = send(
            &app,
            "POST",
            "/api/encounter-tables/preview",
            None,
            Some(json!({
                "name": "Sky Castle",
                "die_size": 6,
                "filters": { "monster_types": ["dragon"] }
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("monsters match"));
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let app = TestApp::new().await;
        let (status, body) = send(
            &app,
            "POST",
            "/api/encounter-tables/preview",
            None,
            Some(json!({ "die_size": "twenty" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid request body");
    }

    #[tokio::test]
    async fn test_create_get_and_roll() {
        let app = TestApp::new().await;
        let owner = UserId::new();
        let created = create(&app, owner, create_body("Crypt Crawl")).await;
        assert_eq!(created["entries"].as_array().unwrap().len(), 6);
        assert_eq!(created["user_id"], owner.to_string());
        let id = created["id"].as_str().unwrap().to_string();

        let (status, fetched) =
            send(&app, "GET", &format!("/api/encounter-tables/{id}"), Some(owner), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["name"], "Crypt Crawl");

        let (status, rolled) =
            send(&app, "GET", &format!("/api/encounter-tables/{id}/roll"), Some(owner), None).await;
        assert_eq!(status, StatusCode::OK);
        let roll = rolled["result"]["roll"].as_u64().unwrap();
        assert!((1..=6).contains(&roll));
        assert_eq!(rolled["result"]["rollRange"], json!({ "min": 1, "max": 6 }));
        assert_eq!(rolled["table"]["id"], id.as_str());
        assert!(rolled["result"]["encounter_description"].is_string());
    }

    #[tokio::test]
    async fn test_private_table_access() {
        let app = TestApp::new().await;
        let owner = UserId::new();
        let created = create(&app, owner, create_body("Crypt Crawl")).await;
        let id = created["id"].as_str().unwrap().to_string();
        let uri = format!("/api/encounter-tables/{id}");

        let (status, _) = send(&app, "GET", &uri, None, None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(&app, "GET", &uri, Some(UserId::new()), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(&app, "GET", &uri, Some(app.admin), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, "DELETE", &uri, Some(UserId::new()), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_invalid_and_unknown_ids() {
        let app = TestApp::new().await;
        let (status, body) =
            send(&app, "GET", "/api/encounter-tables/not-a-uuid/roll", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid table ID format");

        let missing = uuid::Uuid::new_v4();
        let (status, body) =
            send(&app, "GET", &format!("/api/encounter-tables/{missing}/roll"), None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Encounter table not found");
    }

    #[tokio::test]
    async fn test_roll_without_entries_is_not_found() {
        let app = TestApp::new().await;
        let owner = UserId::new();
        let mut body = create_body("Empty Halls");
        body["generate_immediately"] = json!(false);
        let created = create(&app, owner, body).await;
        let id = created["id"].as_str().unwrap();

        let (status, body) =
            send(&app, "GET", &format!("/api/encounter-tables/{id}/roll"), Some(owner), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Encounter table entries not found");
    }

    #[tokio::test]
    async fn test_create_requires_user() {
        let app = TestApp::new().await;
        let (status, body) =
            send(&app, "POST", "/api/encounter-tables", None, Some(create_body("Crypt Crawl"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Authentication required");
    }

    #[tokio::test]
    async fn test_update_regenerate_delete() {
        let app = TestApp::new().await;
        let owner = UserId::new();
        let created = create(&app, owner, create_body("Crypt Crawl")).await;
        let id = created["id"].as_str().unwrap().to_string();
        let uri = format!("/api/encounter-tables/{id}");

        let (status, updated) = send(
            &app,
            "PATCH",
            &uri,
            Some(owner),
            Some(json!({ "name": "Deeper Crypt", "description": "Bring torches" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["name"], "Deeper Crypt");
        assert_eq!(updated["description"], "Bring torches");

        let (status, regenerated) =
            send(&app, "POST", &format!("{uri}/generate"), Some(owner), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(regenerated["entries"].as_array().unwrap().len(), 6);

        let (status, _) = send(&app, "DELETE", &uri, Some(owner), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, "GET", &uri, Some(owner), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_paginates() {
        let app = TestApp::new().await;
        let owner = UserId::new();
        for name in ["First Table", "Second Table", "Third Table"] {
            create(&app, owner, create_body(name)).await;
        }
        create(&app, UserId::new(), create_body("Someone Else")).await;

        let (status, page) =
            send(&app, "GET", "/api/encounter-tables?page=2&limit=2", Some(owner), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["data"].as_array().unwrap().len(), 1);
        assert_eq!(page["pagination"]["total"], 3);
        assert_eq!(page["pagination"]["total_pages"], 2);

        let (status, _) =
            send(&app, "GET", "/api/encounter-tables?limit=500", Some(owner), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) =
            send(&app, "GET", "/api/encounter-tables?page=abc", Some(owner), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_share_is_idempotent() {
        let app = TestApp::new().await;
        let owner = UserId::new();
        let created = create(&app, owner, create_body("Crypt Crawl")).await;
        let uri = format!("/api/encounter-tables/{}/share", created["id"].as_str().unwrap());

        let (status, first) =
            send(&app, "PATCH", &uri, Some(owner), Some(json!({ "is_public": true }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["message"], "Table is now public");
        assert_eq!(first["public_slug"].as_str().unwrap().len(), 8);

        let (_, second) =
            send(&app, "PATCH", &uri, Some(owner), Some(json!({ "is_public": true }))).await;
        assert_eq!(second["message"], "Table is already public");
        assert_eq!(second["public_slug"], first["public_slug"]);
    }

    #[tokio::test]
    async fn test_name_suggestion() {
        let app = TestApp::new().await;
        let (status, body) =
            send(&app, "GET", "/api/encounter-tables/name-suggestion", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body["name"].as_str().unwrap().is_empty());
    }
}
