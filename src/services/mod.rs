pub mod monitor_api;
