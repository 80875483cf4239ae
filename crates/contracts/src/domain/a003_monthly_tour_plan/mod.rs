pub mod aggregate;
pub mod plan_document;
