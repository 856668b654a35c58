pub mod approval;
pub mod lookup;
pub mod permission_request;
pub mod role;
pub mod worker;
