pub mod cpf;
pub mod submission;
pub mod ticket;
pub mod zendesk_api;
