pub mod dimension;
pub mod employer;
pub mod key_skill_history;
pub mod salary_history;
pub mod search_query;
pub mod status_history;
pub mod vacancy;
