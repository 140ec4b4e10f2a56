pub mod download_manager;
