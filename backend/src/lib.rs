
//---------------------------------------
pub mod web_api {
    pub mod routes;
    pub mod controllers;
    pub mod extract;
    pub mod rate_limit;
}

pub use web_api::routes::{build_app, map_routes};
pub use web_api::controllers::*;
//---------------------------------------

//---------------------------------------
pub mod shared {
    pub mod models;
    pub mod dto;
}

pub use shared::models::*;
pub use shared::dto::*;
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
pub mod ado {
    pub mod client;
    pub mod session;
    pub mod transform;
    pub mod wiql;
}
//---------------------------------------

//---------------------------------------
pub mod ai {
    pub mod analysis;
    pub mod recommend;
    pub mod scorer;
}
//---------------------------------------

pub mod logging;
