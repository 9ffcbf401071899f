pub mod erlang_c;
pub mod staffing;
