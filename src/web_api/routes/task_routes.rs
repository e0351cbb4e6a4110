use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{app_state::SharedState, authentication::auth::auth_middleware, task_controller::TaskController};

pub const ROUTER_PATH: &str = "/tasks";

pub fn get_router(app_state: SharedState) -> Router {
    Router::new()
        .route(ROUTER_PATH, get(TaskController::get_all).post(TaskController::create))
        .route(
            format!("{}/", ROUTER_PATH).as_str(),
            get(TaskController::get_all).post(TaskController::create),
        )
        .route(
            format!("{}/:id", ROUTER_PATH).as_str(),
            get(TaskController::get)
                .put(TaskController::edit)
                .delete(TaskController::delete),
        )
        .route(
            format!("{}/:id/suggestions", ROUTER_PATH).as_str(),
            post(TaskController::suggest),
        )
        .route_layer(middleware::from_fn_with_state(app_state.clone(), auth_middleware))
        .with_state(app_state)
}
