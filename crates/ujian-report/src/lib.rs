//! Renderers for [`ujian_core::report::GradingReport`].

pub mod csv_export;
pub mod html;
