pub mod analytics_dto;
pub mod hh_dto;
pub mod search_query_dto;
