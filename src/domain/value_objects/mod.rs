pub mod branch_name;
pub mod remote_url;
