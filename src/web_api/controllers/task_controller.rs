use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};

use crate::{
    app_state::SharedState, create_task_request::CreateTaskRequest,
    list_tasks_query::ListTasksQuery, service_error::ServiceError,
    suggestion_response::SuggestionResponse, task_response::TaskResponse,
    update_task_request::UpdateTaskRequest,
};

pub struct TaskController {}

impl TaskController {
    pub async fn create(
        State(state): State<SharedState>,
        body: Result<Json<CreateTaskRequest>, JsonRejection>,
    ) -> Result<(StatusCode, Json<TaskResponse>), ServiceError> {
        let Json(request) = body?;
        let task = state.task_service.create_task(request).await?;
        Ok((StatusCode::CREATED, Json(task.into())))
    }

    pub async fn get_all(
        State(state): State<SharedState>,
        query: Result<Query<ListTasksQuery>, QueryRejection>,
    ) -> Result<Json<Vec<TaskResponse>>, ServiceError> {
        let Query(query) = query?;
        let tasks = state.task_service.list_tasks(query).await?;
        Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
    }

    pub async fn get(
        State(state): State<SharedState>,
        id: Result<Path<u64>, PathRejection>,
    ) -> Result<Json<TaskResponse>, ServiceError> {
        let Path(id) = id?;
        let task = state.task_service.get_task(id).await?;
        Ok(Json(task.into()))
    }

    pub async fn edit(
        State(state): State<SharedState>,
        id: Result<Path<u64>, PathRejection>,
        body: Result<Json<UpdateTaskRequest>, JsonRejection>,
    ) -> Result<Json<TaskResponse>, ServiceError> {
        let Path(id) = id?;
        let Json(request) = body?;
        let task = state.task_service.update_task(id, request).await?;
        Ok(Json(task.into()))
    }

    pub async fn delete(
        State(state): State<SharedState>,
        id: Result<Path<u64>, PathRejection>,
    ) -> Result<StatusCode, ServiceError> {
        let Path(id) = id?;
        state.task_service.delete_task(id).await?;
        Ok(StatusCode::NO_CONTENT)
    }

    pub async fn suggest(
        State(state): State<SharedState>,
        id: Result<Path<u64>, PathRejection>,
    ) -> Result<(StatusCode, Json<SuggestionResponse>), ServiceError> {
        let Path(id) = id?;
        let suggestion = state.task_service.generate_suggestion(id).await?;
        Ok((StatusCode::CREATED, Json(suggestion.into())))
    }
}
