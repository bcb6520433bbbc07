pub mod network_file;
