pub mod data;
pub mod presenter;
pub mod ssr;
