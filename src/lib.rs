#![allow(
    clippy::float_cmp,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss
)]

pub mod config;
pub mod decision;
pub mod error;
pub mod ev;
pub mod features;
pub mod gate;
pub mod oracle;
pub mod orchestrate;
pub mod probability;
pub mod schema;
pub mod signals;
pub mod strategies;
pub mod strike;
