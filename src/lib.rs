//---------------------------------------
pub mod web_api {
    pub mod routes;
    pub mod controllers;
}

pub use web_api::routes::map_routes;
pub use web_api::controllers::*;
//---------------------------------------

//---------------------------------------
pub mod shared {
    pub mod models;
    pub mod dto;
    pub mod service_error;
}

pub use shared::models::*;
pub use shared::dto::*;
pub use shared::service_error;
//---------------------------------------

//---------------------------------------
pub mod authentication {
    pub mod auth;
}
//---------------------------------------

//---------------------------------------
pub mod data_access {
    pub mod data_context;
}
//---------------------------------------

//---------------------------------------
pub mod services {
    pub mod suggestion_generator;
    pub mod task_service;
}
//---------------------------------------

#[cfg(test)]
mod test_support;
