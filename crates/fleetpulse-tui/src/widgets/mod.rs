pub mod sparkline;
pub mod status_badge;
pub mod sub_tabs;
pub mod time_fmt;
