pub mod api;

pub use api::{
    AnkiClient,
    ApiResponse,
    Field,
    Note,
};
