pub mod client_info;
pub mod slug;
pub mod url_check;
