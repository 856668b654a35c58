pub mod approval;
pub mod lookup;
pub mod permission;
pub mod report;
pub mod worker;
