pub mod career;
pub mod charts;
pub mod dataset;
pub mod http_client;
pub mod state;
pub mod view;
pub mod weight_class;
