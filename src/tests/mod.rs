pub mod helpers;

mod context;
