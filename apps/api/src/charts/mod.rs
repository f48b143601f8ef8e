// Chart-ready views of a stored scored result, joined against the salary
// collections by exact job title.

pub mod builders;
pub mod handlers;
